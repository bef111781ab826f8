//! Image — an owned, row-major raster of [`Pixel`]s.
//!
//! Modifier application swaps the pixel buffer wholesale; pixels are never
//! mutated in place from outside. The buffer and the canvas dimensions are
//! only ever changed together through [`Image::apply_filter`].

use std::fmt;

use crate::error::{Error, Result};
use crate::ops::Modifier;
use crate::pixel::Pixel;

#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pixels: Vec<Pixel>,
    width: u32,
    height: u32,
    depth: u32,
}

impl Image {
    /// `pixels` is row-major: y outer, x inner. `depth` is the maximum channel
    /// value (typically 255) and is fixed for the lifetime of the image.
    pub fn new(pixels: Vec<Pixel>, width: u32, height: u32, depth: u32) -> Result<Self> {
        if width == 0 || height == 0 || depth == 0 {
            return Err(Error::InvalidArgument(
                "image width, height, and depth must all be positive".into(),
            ));
        }
        Ok(Self {
            pixels,
            width,
            height,
            depth,
        })
    }

    /// A black-and-white checkerboard with square cells of side `cell`.
    pub fn checkerboard(width: u32, height: u32, depth: u32, cell: u32) -> Result<Self> {
        if cell == 0 || width % cell != 0 || height % cell != 0 {
            return Err(Error::InvalidArgument(
                "cell size must be positive and divide both dimensions".into(),
            ));
        }
        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                let white = (x / cell + y / cell) % 2 == 1;
                let value = if white { depth.min(255) as u8 } else { 0 };
                pixels.push(Pixel::from_rgb(x, y, value, value, value));
            }
        }
        Self::new(pixels, width, height, depth)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// `(width, height, depth)`.
    pub fn props(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.depth)
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Flat `y * width + x` lookup. `None` when out of range.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<&Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize)
    }

    /// Replace this image's pixels with the modifier's output. Downscale also
    /// shrinks the canvas. On any error the image is left untouched.
    pub fn apply_filter(&mut self, modifier: &Modifier) -> Result<()> {
        let pixels = modifier.modify(self)?;
        if let Modifier::Downscale { width, height } = *modifier {
            self.change_canvas_size(width, height)?;
        }
        self.pixels = pixels;
        Ok(())
    }

    /// Shrink-only resize of the canvas dimensions. The pixel buffer is not
    /// touched; the caller supplies the already-reduced pixel set.
    pub fn change_canvas_size(&mut self, width: u32, height: u32) -> Result<()> {
        if width > self.width || height > self.height {
            return Err(Error::InvalidArgument(
                "width and height must not exceed the current canvas size".into(),
            ));
        }
        self.width = width;
        self.height = height;
        Ok(())
    }
}

impl fmt::Display for Image {
    /// Header then every pixel in row-major order, one trailing newline. The
    /// PPM exporter prefixes this with `"P3\n"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}\n{}\n", self.width, self.height, self.depth)?;
        for p in &self.pixels {
            write!(f, "{}", p)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(width: u32, height: u32, r: u8, g: u8, b: u8) -> Image {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.push(Pixel::from_rgb(x, y, r, g, b));
            }
        }
        Image::new(pixels, width, height, 255).unwrap()
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(Image::new(Vec::new(), 0, 4, 255).is_err());
        assert!(Image::new(Vec::new(), 4, 4, 0).is_err());
    }

    #[test]
    fn canvas_resize_is_shrink_only() {
        let mut img = uniform(4, 4, 10, 20, 30);
        assert!(img.change_canvas_size(4, 5).is_err());
        img.change_canvas_size(2, 3).unwrap();
        assert_eq!((img.width(), img.height()), (2, 3));
        // Buffer untouched by the resize itself.
        assert_eq!(img.pixels().len(), 16);
    }

    #[test]
    fn pixel_lookup_is_row_major() {
        let img = uniform(3, 2, 1, 2, 3);
        assert_eq!(img.get_pixel(2, 1).unwrap().coords(), (2, 1));
        assert!(img.get_pixel(3, 0).is_none());
        assert!(img.get_pixel(0, 2).is_none());
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let img = Image::checkerboard(4, 4, 255, 2).unwrap();
        assert_eq!(img.get_pixel(0, 0).unwrap().color(), (0, 0, 0));
        assert_eq!(img.get_pixel(2, 0).unwrap().color(), (255, 255, 255));
        assert_eq!(img.get_pixel(2, 2).unwrap().color(), (0, 0, 0));
        assert!(Image::checkerboard(5, 4, 255, 2).is_err());
    }

    #[test]
    fn display_round_trips_header_and_pixels() {
        let img = uniform(2, 1, 7, 8, 9);
        assert_eq!(img.to_string(), "2\n1\n255\n7 8 9  7 8 9  \n");
    }
}
