//! Native GeoTIFF reading/writing for grids
//!
//! Uses the `tiff` crate for TIFF I/O. Grids are written as single-band
//! 32-bit float images with `ModelPixelScaleTag`/`ModelTiepointTag`
//! georeferencing; the raster-type geokey records the registration
//! (`RasterPixelIsArea` for pixel, `RasterPixelIsPoint` for gridline).

use std::fs::File;
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::TiffEncoder;
use tiff::encoder::colortype::Gray32Float;
use tiff::tags::Tag;

use crate::domain::{GridDomain, Registration};
use crate::error::{Error, Result};
use crate::grid::Grid;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;

const RASTER_PIXEL_IS_AREA: u16 = 1;
const RASTER_PIXEL_IS_POINT: u16 = 2;

/// Write a grid to a GeoTIFF file.
///
/// Values are stored as f32; NaN empty nodes survive the round trip.
pub fn write_geotiff<P: AsRef<Path>>(grid: &Grid, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut encoder =
        TiffEncoder::new(file).map_err(|e| Error::Other(format!("TIFF encoder error: {e}")))?;

    let (rows, cols) = grid.shape();
    let data: Vec<f32> = grid.values().map(|v| v as f32).collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {e}")))?;

    let domain = grid.domain();

    // ModelPixelScaleTag
    let scale = vec![domain.x_inc, domain.y_inc, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), scale.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write scale tag: {e}")))?;

    // ModelTiepointTag: raster (0,0) maps to the domain's NW corner for
    // pixel registration, to the NW node for gridline registration.
    let tiepoint = vec![0.0, 0.0, 0.0, domain.west, domain.north, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT), tiepoint.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write tiepoint tag: {e}")))?;

    let raster_type = match domain.registration {
        Registration::Pixel => RASTER_PIXEL_IS_AREA,
        Registration::Gridline => RASTER_PIXEL_IS_POINT,
    };
    let model_type: u16 = if domain.geographic { 2 } else { 1 };
    let geokeys: Vec<u16> = vec![
        1, 1, 0, 2, // Version 1.1.0, 2 keys
        1024, 0, 1, model_type, // GTModelTypeGeoKey
        1025, 0, 1, raster_type, // GTRasterTypeGeoKey
    ];
    image
        .encoder()
        .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), geokeys.as_slice())
        .map_err(|e| Error::Other(format!("Cannot write geokey tag: {e}")))?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {e}")))?;

    Ok(())
}

/// Read a GeoTIFF written by [`write_geotiff`] back into a grid.
///
/// The domain is reconstructed from the georeferencing tags; the empty-node
/// sentinel is assumed to be NaN.
pub fn read_geotiff<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let file = File::open(path.as_ref())?;
    let mut decoder =
        Decoder::new(file).map_err(|e| Error::Other(format!("TIFF decode error: {e}")))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {e}")))?;
    let (rows, cols) = (height as usize, width as usize);

    let result = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {e}")))?;
    let data: Vec<f64> = match result {
        DecodingResult::F32(buf) => buf.iter().map(|&v| v as f64).collect(),
        DecodingResult::F64(buf) => buf,
        _ => {
            return Err(Error::Other(
                "Unsupported TIFF pixel format for grids".to_string(),
            ));
        }
    };

    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Other("No pixel scale tag".into()))?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Other("No tiepoint tag".into()))?;
    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::Other("Cannot determine grid georeferencing".into()));
    }

    let registration = match decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag) {
        Ok(keys) => raster_type_from_geokeys(&keys),
        Err(_) => Registration::Pixel,
    };

    let (x_inc, y_inc) = (scale[0], scale[1]);
    let (west, north) = (tiepoint[3], tiepoint[4]);
    let x_steps = match registration {
        Registration::Gridline => cols.saturating_sub(1),
        Registration::Pixel => cols,
    };
    let y_steps = match registration {
        Registration::Gridline => rows.saturating_sub(1),
        Registration::Pixel => rows,
    };
    let domain = GridDomain::cartesian(
        west,
        west + x_steps as f64 * x_inc,
        north - y_steps as f64 * y_inc,
        north,
        x_inc,
        y_inc,
        registration,
    )?;

    Grid::from_vec(domain, data, f64::NAN)
}

fn raster_type_from_geokeys(keys: &[u16]) -> Registration {
    // GeoKeyDirectory entries are (key id, location, count, value) quads
    // after the 4-element header.
    for entry in keys[4.min(keys.len())..].chunks(4) {
        if entry.len() == 4 && entry[0] == 1025 {
            return if entry[3] == RASTER_PIXEL_IS_POINT {
                Registration::Gridline
            } else {
                Registration::Pixel
            };
        }
    }
    Registration::Pixel
}
