//! Linear color transforms (greyscale, sepia).
//!
//! Each pixel's new RGB is a 3x3 matrix multiply against its old RGB. No
//! spatial neighbor access, so the whole image maps cell-for-cell.

use rayon::prelude::*;

use crate::ops::Kernel;
use crate::pixel::Pixel;
use crate::raster::Image;

/// Rec. 709 luma coefficients on every output row.
pub fn greyscale_kernel() -> Kernel {
    Kernel::known(
        3,
        vec![
            0.2126, 0.7152, 0.0722, //
            0.2126, 0.7152, 0.0722, //
            0.2126, 0.7152, 0.0722,
        ],
    )
}

/// The standard sepia matrix.
pub fn sepia_kernel() -> Kernel {
    Kernel::known(
        3,
        vec![
            0.393, 0.769, 0.189, //
            0.349, 0.686, 0.168, //
            0.272, 0.534, 0.131,
        ],
    )
}

/// Apply the color matrix to every pixel. Only the first nine flattened
/// weights participate; a 3x3 kernel uses all of them.
pub fn apply(image: &Image, kernel: &Kernel) -> Vec<Pixel> {
    let w = kernel.weights();
    let rows: Vec<Vec<Pixel>> = (0..image.height())
        .into_par_iter()
        .map(|y| {
            let mut row = Vec::with_capacity(image.width() as usize);
            for x in 0..image.width() {
                if let Some(p) = image.get_pixel(x, y) {
                    let r = p.apply_to_r(w[0]) + p.apply_to_g(w[1]) + p.apply_to_b(w[2]);
                    let g = p.apply_to_r(w[3]) + p.apply_to_g(w[4]) + p.apply_to_b(w[5]);
                    let b = p.apply_to_r(w[6]) + p.apply_to_g(w[7]) + p.apply_to_b(w[8]);
                    row.push(Pixel::new(x, y, r, g, b));
                }
            }
            row
        })
        .collect();

    rows.into_iter().flatten().collect()
}
