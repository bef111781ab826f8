//! Spatial kernel filters (blur, sharpen).
//!
//! Each output pixel is the kernel-weighted sum of its neighborhood. Kernel
//! cells that fall outside the image are dropped without renormalizing, so
//! normalized kernels attenuate edge and corner pixels.

use rayon::prelude::*;

use crate::ops::Kernel;
use crate::pixel::Pixel;
use crate::raster::Image;

/// 3x3 Gaussian-like blur.
pub fn blur_kernel() -> Kernel {
    Kernel::known(
        3,
        vec![
            1.0 / 16.0,
            1.0 / 8.0,
            1.0 / 16.0,
            1.0 / 8.0,
            1.0 / 4.0,
            1.0 / 8.0,
            1.0 / 16.0,
            1.0 / 8.0,
            1.0 / 16.0,
        ],
    )
}

/// 5x5 unsharp-style kernel: center 1, inner ring 1/4, outer ring -1/8.
pub fn sharpen_kernel() -> Kernel {
    let mut weights = vec![-1.0 / 8.0; 25];
    for row in 1..4 {
        for col in 1..4 {
            weights[row * 5 + col] = 1.0 / 4.0;
        }
    }
    weights[12] = 1.0;
    Kernel::known(5, weights)
}

/// Convolve the whole image. Row-parallel and deterministic: every output
/// pixel depends only on the source buffer.
pub fn convolve(image: &Image, kernel: &Kernel) -> Vec<Pixel> {
    let width = image.width();
    let height = image.height();
    let radius = kernel.radius() as i64;
    let size = kernel.size() as i64;
    let weights = kernel.weights();

    let rows: Vec<Vec<Pixel>> = (0..height)
        .into_par_iter()
        .map(|y| {
            let mut row = Vec::with_capacity(width as usize);
            for x in 0..width {
                let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
                for i in -radius..=radius {
                    for j in -radius..=radius {
                        let nx = x as i64 + j;
                        let ny = y as i64 + i;
                        if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
                            continue;
                        }
                        let weight = weights[((i + radius) * size + (j + radius)) as usize];
                        if let Some(neighbor) = image.get_pixel(nx as u32, ny as u32) {
                            let (nr, ng, nb) = neighbor.apply_to_all_channels(weight);
                            r += nr;
                            g += ng;
                            b += nb;
                        }
                    }
                }
                row.push(Pixel::new(x, y, r, g, b));
            }
            row
        })
        .collect();

    rows.into_iter().flatten().collect()
}
