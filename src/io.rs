//! File I/O: raster codecs and the layer state text format.
//!
//! Plain-text PPM (`P3`) is parsed and written here directly; PNG, JPEG, and
//! BMP go through the `image` crate. The layer state format is the text dump
//! produced by [`Layer`]'s `Display` impl and must round-trip exactly.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::str::SplitWhitespace;

use image::RgbImage;

use crate::error::{Error, Result};
use crate::layer::{Layer, LayerProps};
use crate::pixel::Pixel;
use crate::raster::Image;

// ============================================================================
// Images
// ============================================================================

/// Load an image, dispatching on the file extension.
pub fn read_image(path: &Path) -> Result<Image> {
    match extension_of(path).as_str() {
        "ppm" => parse_ppm(&read_to_string(path)?),
        "png" | "jpg" | "jpeg" | "bmp" => read_raster(path),
        other => Err(Error::Unsupported(other.to_string())),
    }
}

/// Write an image, dispatching on the file extension.
pub fn write_image(path: &Path, image: &Image) -> Result<()> {
    match extension_of(path).as_str() {
        "ppm" => {
            fs::write(path, format!("P3\n{}", image))?;
            Ok(())
        }
        "png" | "jpg" | "jpeg" | "bmp" => {
            let mut buffer = RgbImage::new(image.width(), image.height());
            for p in image.pixels() {
                let (r, g, b) = p.color();
                buffer.put_pixel(p.x(), p.y(), image::Rgb([r, g, b]));
            }
            buffer.save(path)?;
            Ok(())
        }
        other => Err(Error::Unsupported(other.to_string())),
    }
}

/// Parse a plain-text `P3` raster. Comment lines starting with `#` are
/// ignored; everything else is a whitespace-separated token stream.
pub fn parse_ppm(src: &str) -> Result<Image> {
    let stripped: String = src
        .lines()
        .filter(|line| !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");
    let mut tokens = Tokens::new(&stripped);

    if tokens.next_token()? != "P3" {
        return Err(Error::InvalidFormat(
            "plain PPM file must begin with P3".into(),
        ));
    }
    parse_raster(&mut tokens)
}

/// Decode PNG/JPEG/BMP into the flat pixel model. Depth is fixed at 255.
fn read_raster(path: &Path) -> Result<Image> {
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    let decoded = image::open(path)?.to_rgb8();
    let (width, height) = decoded.dimensions();

    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        for x in 0..width {
            let image::Rgb([r, g, b]) = *decoded.get_pixel(x, y);
            pixels.push(Pixel::from_rgb(x, y, r, g, b));
        }
    }
    Image::new(pixels, width, height, 255)
}

// ============================================================================
// Layer state
// ============================================================================

/// Load a layer state file (the text form of a whole stack).
pub fn read_state(path: &Path) -> Result<Layer> {
    parse_state(&read_to_string(path)?)
}

/// Write a layer state file.
pub fn write_state(path: &Path, layer: &Layer) -> Result<()> {
    fs::write(path, layer.to_string())?;
    Ok(())
}

/// Parse the `LAYER` state format: header, then per image a visibility line
/// and the image's serialized form.
pub fn parse_state(src: &str) -> Result<Layer> {
    let mut tokens = Tokens::new(src);

    if tokens.next_token()? != "LAYER" {
        return Err(Error::InvalidFormat("not a layer state file".into()));
    }

    let count = tokens.next_usize()?;
    let width = tokens.next_i64()?;
    let height = tokens.next_i64()?;
    let depth = tokens.next_i64()?;

    // An empty stack serializes its unset props as -1.
    let mut layer = if width < 0 || height < 0 || depth < 0 {
        Layer::new()
    } else {
        Layer::with_props(LayerProps {
            width: width as u32,
            height: height as u32,
            depth: depth as u32,
        })
    };

    for i in 0..count {
        let visible = match tokens.next_token()? {
            "true" => true,
            "false" => false,
            other => {
                return Err(Error::InvalidFormat(format!(
                    "expected a visibility flag, found '{}'",
                    other
                )));
            }
        };
        layer.add_layer(parse_raster(&mut tokens)?)?;
        if !visible {
            layer.toggle_visibility(i + 1)?;
        }
    }

    Ok(layer)
}

/// Shared body parser: `width height depth` then `width * height` RGB
/// triples in row-major order.
fn parse_raster(tokens: &mut Tokens<'_>) -> Result<Image> {
    let width = tokens.next_u32()?;
    let height = tokens.next_u32()?;
    let depth = tokens.next_u32()?;

    let mut pixels = Vec::with_capacity((width as usize) * (height as usize));
    for y in 0..height {
        for x in 0..width {
            let r = tokens.next_i64()?;
            let g = tokens.next_i64()?;
            let b = tokens.next_i64()?;
            pixels.push(Pixel::new(x, y, r as f64, g as f64, b as f64));
        }
    }
    Image::new(pixels, width, height, depth)
}

// ============================================================================
// Helpers
// ============================================================================

struct Tokens<'a> {
    inner: SplitWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            inner: src.split_whitespace(),
        }
    }

    fn next_token(&mut self) -> Result<&'a str> {
        self.inner
            .next()
            .ok_or_else(|| Error::InvalidFormat("unexpected end of file".into()))
    }

    fn next_i64(&mut self) -> Result<i64> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| Error::InvalidFormat(format!("expected an integer, found '{}'", token)))
    }

    fn next_u32(&mut self) -> Result<u32> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| Error::InvalidFormat(format!("expected a count, found '{}'", token)))
    }

    fn next_usize(&mut self) -> Result<usize> {
        let token = self.next_token()?;
        token
            .parse()
            .map_err(|_| Error::InvalidFormat(format!("expected a count, found '{}'", token)))
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(r: u8, g: u8, b: u8) -> Image {
        let mut pixels = Vec::new();
        for y in 0..2 {
            for x in 0..2 {
                pixels.push(Pixel::from_rgb(x, y, r, g, b));
            }
        }
        Image::new(pixels, 2, 2, 255).unwrap()
    }

    #[test]
    fn ppm_parses_with_comments() {
        let src = "P3\n# made by hand\n2 1\n255\n# pixels follow\n10 20 30 40 50 60\n";
        let img = parse_ppm(src).unwrap();
        assert_eq!((img.width(), img.height(), img.depth()), (2, 1, 255));
        assert_eq!(img.get_pixel(0, 0).unwrap().color(), (10, 20, 30));
        assert_eq!(img.get_pixel(1, 0).unwrap().color(), (40, 50, 60));
    }

    #[test]
    fn ppm_requires_the_p3_magic() {
        assert!(matches!(
            parse_ppm("P6\n1 1\n255\n0 0 0"),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn truncated_ppm_is_an_error() {
        assert!(parse_ppm("P3\n2 2\n255\n1 2 3").is_err());
    }

    #[test]
    fn ppm_clamps_out_of_range_channels() {
        let img = parse_ppm("P3\n1 1\n255\n999 -4 77").unwrap();
        assert_eq!(img.get_pixel(0, 0).unwrap().color(), (255, 0, 77));
    }

    #[test]
    fn state_round_trips_pixels_visibility_and_props() {
        let mut layer = Layer::new();
        layer.add_layer(uniform(1, 2, 3)).unwrap();
        layer.add_layer(uniform(200, 100, 0)).unwrap();
        layer.toggle_visibility(2).unwrap();

        let restored = parse_state(&layer.to_string()).unwrap();
        assert_eq!(restored.count(), 2);
        assert_eq!(restored.props(), layer.props());
        assert_eq!(restored.visibility(), &[true, false]);
        for (a, b) in restored.images().iter().zip(layer.images()) {
            assert_eq!(a.pixels(), b.pixels());
        }
        // Second generation survives too.
        assert_eq!(parse_state(&restored.to_string()).unwrap().to_string(), restored.to_string());
    }

    #[test]
    fn empty_state_round_trips_the_sentinel_header() {
        let restored = parse_state(&Layer::new().to_string()).unwrap();
        assert_eq!(restored.count(), 0);
        assert!(restored.props().is_none());
    }

    #[test]
    fn state_rejects_other_documents() {
        assert!(matches!(
            parse_state("P3\n1 1\n255\n0 0 0"),
            Err(Error::InvalidFormat(_))
        ));
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = read_image(Path::new("picture.tiff")).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
        let err = write_image(Path::new("picture.xyz"), &uniform(0, 0, 0)).unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
    }

    #[test]
    fn missing_file_reports_not_found() {
        let err = read_image(Path::new("no_such_file.ppm")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn png_save_and_load_round_trip() {
        let path = std::env::temp_dir().join("pixelstack_io_test.png");
        let img = uniform(12, 34, 56);
        write_image(&path, &img).unwrap();
        let loaded = read_image(&path).unwrap();
        assert_eq!(loaded.pixels(), img.pixels());
        let _ = fs::remove_file(&path);
    }
}
