//! Downscale — nearest-neighbor resampling to a smaller canvas.

use crate::error::{Error, Result};
use crate::pixel::Pixel;
use crate::raster::Image;

/// Build the reduced pixel list for a `new_width` x `new_height` canvas.
///
/// Each target cell samples the source at the rounded ratio coordinate;
/// target cells whose mapped source falls outside the original bounds are
/// dropped. The canvas itself is shrunk afterwards by the caller through
/// [`Image::change_canvas_size`], whose shrink-only check makes an upscale
/// attempt fail before any pixels are committed.
pub fn resample(image: &Image, new_width: u32, new_height: u32) -> Result<Vec<Pixel>> {
    if new_width == 0 || new_height == 0 {
        return Err(Error::InvalidArgument(
            "downscale dimensions must be positive".into(),
        ));
    }

    let x_ratio = image.width() as f32 / new_width as f32;
    let y_ratio = image.height() as f32 / new_height as f32;

    let mut pixels = Vec::with_capacity((new_width * new_height) as usize);
    for i in 0..new_height {
        for j in 0..new_width {
            let x = (j as f32 * x_ratio).round() as u32;
            let y = (i as f32 * y_ratio).round() as u32;
            if let Some(src) = image.get_pixel(x, y) {
                let (r, g, b) = src.color();
                pixels.push(Pixel::from_rgb(j, i, r, g, b));
            }
        }
    }
    Ok(pixels)
}
