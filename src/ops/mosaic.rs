//! Mosaic — Voronoi-like centroid clustering.
//!
//! Pixels are grouped around randomly placed centroids and repainted with
//! their cluster's mean color. Centroid lookup uses an expanding square
//! window so most pixels only compare against nearby centroids.

use crate::error::{Error, Result};
use crate::pixel::Pixel;
use crate::raster::Image;

/// Repaint every pixel with its cluster's mean color.
///
/// A request for `seeds` plants `seeds - 1` centroids, capped at the pixel
/// count; a request that yields zero centroids is refused. Output stays in
/// raster order (y ascending, then x), matching the input ordering.
pub fn apply(image: &Image, seeds: u32, rng_seed: u64) -> Result<Vec<Pixel>> {
    let pixels = image.pixels();
    let centroid_count = (seeds as usize).saturating_sub(1).min(pixels.len());
    if centroid_count == 0 {
        return Err(Error::InvalidArgument(
            "mosaic needs at least two seeds and a non-empty image".into(),
        ));
    }

    let centroids = sow_seeds(pixels, centroid_count, rng_seed);

    // Initial half-width of the centroid search window. Guarded to one so a
    // large seed count can never collapse the window to nothing.
    let search_dist =
        (image.width().min(image.height()) as i64 / (seeds as f64).sqrt() as i64).max(1);

    // Assign each pixel to its nearest centroid and accumulate channel sums.
    let mut sums = vec![[0.0f64; 3]; centroid_count];
    let mut counts = vec![0u64; centroid_count];
    let mut assignment = Vec::with_capacity(pixels.len());
    for p in pixels {
        let c = nearest_centroid(&centroids, p, search_dist);
        let (r, g, b) = p.color();
        sums[c][0] += r as f64;
        sums[c][1] += g as f64;
        sums[c][2] += b as f64;
        counts[c] += 1;
        assignment.push(c);
    }

    // Every centroid is itself a pixel and always wins its own assignment,
    // so no cluster is empty.
    let means: Vec<[f64; 3]> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &n)| [s[0] / n as f64, s[1] / n as f64, s[2] / n as f64])
        .collect();

    Ok(pixels
        .iter()
        .zip(&assignment)
        .map(|(p, &c)| Pixel::new(p.x(), p.y(), means[c][0], means[c][1], means[c][2]))
        .collect())
}

/// Pick `count` distinct pixel positions via a partial Fisher-Yates shuffle.
fn sow_seeds(pixels: &[Pixel], count: usize, rng_seed: u64) -> Vec<(i64, i64)> {
    let mut rng = SeedRng::new(rng_seed);
    let mut indices: Vec<usize> = (0..pixels.len()).collect();
    for i in 0..count {
        let j = i + (rng.next() % (indices.len() - i) as u64) as usize;
        indices.swap(i, j);
    }
    indices[..count]
        .iter()
        .map(|&i| (pixels[i].x() as i64, pixels[i].y() as i64))
        .collect()
}

/// Index of the Euclidean-nearest centroid, searched through an expanding
/// square window. The window starts at `+-search_dist` and widens by
/// `2 * search_dist` each round until at least one centroid lies strictly
/// inside; ties go to the first centroid encountered.
fn nearest_centroid(centroids: &[(i64, i64)], pixel: &Pixel, search_dist: i64) -> usize {
    let px = pixel.x() as i64;
    let py = pixel.y() as i64;
    let incr = search_dist * 2;

    let mut half = search_dist;
    loop {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &(cx, cy)) in centroids.iter().enumerate() {
            let inside = cx > px - half && cx < px + half && cy > py - half && cy < py + half;
            if !inside {
                continue;
            }
            let dist = ((cx - px) as f64).hypot((cy - py) as f64);
            match best {
                Some((_, d)) if dist >= d => {}
                _ => best = Some((idx, dist)),
            }
        }
        if let Some((idx, _)) = best {
            return idx;
        }
        half += incr;
    }
}

/// Small deterministic generator (splitmix-style multiply-xor mixing) so a
/// fixed seed reproduces the same mosaic.
struct SeedRng {
    state: u64,
}

impl SeedRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Modifier;
    use std::collections::HashSet;

    fn gradient(width: u32, height: u32) -> Image {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 17 + y * 41) % 256) as u8;
                pixels.push(Pixel::from_rgb(x, y, v, v.wrapping_add(40), v / 2));
            }
        }
        Image::new(pixels, width, height, 255).unwrap()
    }

    #[test]
    fn output_matches_input_size_and_order() {
        let mut img = gradient(12, 9);
        img.apply_filter(&Modifier::mosaic_seeded(8, 42).unwrap())
            .unwrap();
        assert_eq!(img.pixels().len(), 12 * 9);
        for (i, p) in img.pixels().iter().enumerate() {
            assert_eq!(p.coords(), (i as u32 % 12, i as u32 / 12));
        }
    }

    #[test]
    fn cluster_count_respects_off_by_one() {
        let mut img = gradient(16, 16);
        img.apply_filter(&Modifier::mosaic_seeded(5, 7).unwrap())
            .unwrap();
        let colors: HashSet<(u8, u8, u8)> = img.pixels().iter().map(|p| p.color()).collect();
        // At most seeds - 1 = 4 distinct mean colors.
        assert!(colors.len() <= 4, "got {} colors", colors.len());
    }

    #[test]
    fn uniform_image_stays_uniform() {
        let mut pixels = Vec::new();
        for y in 0..6 {
            for x in 0..6 {
                pixels.push(Pixel::from_rgb(x, y, 90, 120, 150));
            }
        }
        let mut img = Image::new(pixels, 6, 6, 255).unwrap();
        img.apply_filter(&Modifier::mosaic_seeded(4, 99).unwrap())
            .unwrap();
        for p in img.pixels() {
            assert_eq!(p.color(), (90, 120, 150));
        }
    }

    #[test]
    fn single_seed_request_is_refused() {
        // One requested seed plants zero centroids.
        let mut img = gradient(4, 4);
        assert!(
            img.apply_filter(&Modifier::mosaic_seeded(1, 3).unwrap())
                .is_err()
        );
    }

    #[test]
    fn same_rng_seed_reproduces_same_mosaic() {
        let base = gradient(10, 10);
        let modifier = Modifier::mosaic_seeded(6, 1234).unwrap();
        let mut a = base.clone();
        let mut b = base.clone();
        a.apply_filter(&modifier).unwrap();
        b.apply_filter(&modifier).unwrap();
        assert_eq!(a.pixels(), b.pixels());
    }
}
