//! Layer — an ordered stack of same-sized images with per-slot visibility,
//! a current selection with history, and an averaging blend.
//!
//! Visibility is a plain `Vec<bool>` running parallel to the image list, and
//! the selection history is a dedup-and-prepend list: small stacks make an
//! O(n) remove-and-reinsert perfectly adequate.

use std::fmt;

use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::ops::Modifier;
use crate::pixel::Pixel;
use crate::raster::Image;

/// Shared dimensions of every image in a stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerProps {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

/// An empty stack has no props yet; it adopts them from the first image added.
#[derive(Debug, Clone)]
pub struct Layer {
    images: Vec<Image>,
    visible: Vec<bool>,
    current: usize,
    history: Vec<usize>,
    props: Option<LayerProps>,
}

impl Layer {
    pub fn new() -> Self {
        Self {
            images: Vec::new(),
            visible: Vec::new(),
            current: 0,
            history: vec![0],
            props: None,
        }
    }

    /// An empty stack whose dimensions are already fixed (state files carry
    /// the props ahead of the images).
    pub fn with_props(props: LayerProps) -> Self {
        Self {
            props: Some(props),
            ..Self::new()
        }
    }

    /// Build a stack from an initial image list; all images must agree on
    /// width, height, and depth. Every image starts visible.
    pub fn from_images(images: Vec<Image>) -> Result<Self> {
        let mut layer = Self::new();
        for image in images {
            layer.add_layer(image)?;
        }
        layer.history = vec![0];
        Ok(layer)
    }

    pub fn count(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn props(&self) -> Option<LayerProps> {
        self.props
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Visibility flags, parallel to [`Layer::images`].
    pub fn visibility(&self) -> &[bool] {
        &self.visible
    }

    /// Append an image. An empty stack adopts the image's props; a populated
    /// one requires an exact match.
    pub fn add_layer(&mut self, image: Image) -> Result<()> {
        let (width, height, depth) = image.props();
        let incoming = LayerProps {
            width,
            height,
            depth,
        };
        match self.props {
            None => self.props = Some(incoming),
            Some(p) if p == incoming => {}
            Some(_) => {
                return Err(Error::InvalidArgument(
                    "image must share the stack's width, height, and depth".into(),
                ));
            }
        }
        // Seed the selection history with the next sequential slot so a
        // freshly added image counts as recently selected.
        self.history.push(self.history.len());
        self.images.push(image);
        self.visible.push(true);
        Ok(())
    }

    /// The image at a 1-based index.
    pub fn get_layer(&self, index: usize) -> Result<&Image> {
        self.checked_index(index).map(|i| &self.images[i])
    }

    /// Select the current image by 1-based index. The history drops any
    /// earlier occurrence of the index and prepends it, most-recent-first.
    pub fn set_current(&mut self, index: usize) -> Result<()> {
        let idx = self.checked_index(index)?;
        self.current = idx;
        self.history.retain(|&h| h != idx);
        self.history.insert(0, idx);
        Ok(())
    }

    /// Flip the visibility flag at a 1-based index.
    pub fn toggle_visibility(&mut self, index: usize) -> Result<()> {
        let idx = self.checked_index(index)?;
        self.visible[idx] = !self.visible[idx];
        Ok(())
    }

    pub fn has_current(&self) -> bool {
        !self.images.is_empty()
    }

    /// The currently selected image.
    pub fn current(&self) -> Result<&Image> {
        self.images
            .get(self.current)
            .ok_or_else(|| Error::InvalidArgument("no current image in an empty stack".into()))
    }

    /// Apply a modifier to the current image only.
    pub fn apply_to_current(&mut self, modifier: &Modifier) -> Result<()> {
        if self.images.is_empty() {
            return Err(Error::InvalidArgument(
                "no image to apply a modifier to".into(),
            ));
        }
        self.images[self.current].apply_filter(modifier)
    }

    /// Apply a modifier to every image and shrink the stack's own dimensions
    /// to `width` x `height`. Meant for downscaling uniformly across slots.
    pub fn alter_layer(&mut self, modifier: &Modifier, width: u32, height: u32) -> Result<()> {
        let props = match self.props {
            Some(p) if width <= p.width && height <= p.height => p,
            _ => {
                return Err(Error::InvalidArgument(
                    "width and height must not exceed the current stack size".into(),
                ));
            }
        };
        if self.images.is_empty() {
            return Err(Error::InvalidArgument(
                "no image to apply a modifier to".into(),
            ));
        }
        for image in &mut self.images {
            image.apply_filter(modifier)?;
        }
        self.props = Some(LayerProps {
            width,
            height,
            ..props
        });
        Ok(())
    }

    /// The visible images, in stack order.
    pub fn get_visible(&self) -> Vec<&Image> {
        self.images
            .iter()
            .zip(&self.visible)
            .filter(|&(_, &v)| v)
            .map(|(img, _)| img)
            .collect()
    }

    /// Average every channel across the visible images at each coordinate.
    /// Blending an empty stack or one with nothing visible is refused rather
    /// than dividing by zero.
    pub fn blend(&self) -> Result<Image> {
        let props = self
            .props
            .ok_or_else(|| Error::InvalidArgument("nothing to blend in an empty stack".into()))?;
        let visible = self.get_visible();
        if visible.is_empty() {
            return Err(Error::InvalidArgument(
                "cannot blend with zero visible layers".into(),
            ));
        }
        let n = visible.len() as f64;

        let rows: Vec<Vec<Pixel>> = (0..props.height)
            .into_par_iter()
            .map(|y| {
                let mut row = Vec::with_capacity(props.width as usize);
                for x in 0..props.width {
                    let (mut r, mut g, mut b) = (0.0, 0.0, 0.0);
                    for image in &visible {
                        if let Some(p) = image.get_pixel(x, y) {
                            let (pr, pg, pb) = p.color();
                            r += pr as f64;
                            g += pg as f64;
                            b += pb as f64;
                        }
                    }
                    row.push(Pixel::new(x, y, r / n, g / n, b / n));
                }
                row
            })
            .collect();

        Image::new(
            rows.into_iter().flatten().collect(),
            props.width,
            props.height,
            props.depth,
        )
    }

    /// The current image if visible, else the most recently selected visible
    /// predecessor from the history. Stale history slots (left behind by
    /// additions) are skipped.
    pub fn get_current_visible(&self) -> Option<&Image> {
        let current = self.images.get(self.current)?;
        if self.visible[self.current] {
            return Some(current);
        }
        for &idx in self.history.iter().skip(1) {
            if idx < self.images.len() && self.visible[idx] {
                return Some(&self.images[idx]);
            }
        }
        None
    }

    fn checked_index(&self, index: usize) -> Result<usize> {
        if index == 0 || index > self.images.len() {
            return Err(Error::InvalidArgument(format!(
                "no image at index {}",
                index
            )));
        }
        Ok(index - 1)
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Layer {
    /// The layer state text form: header then, per image, a visibility line
    /// and the image's own serialized form. Unset props print as -1.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h, d) = match self.props {
            Some(p) => (p.width as i64, p.height as i64, p.depth as i64),
            None => (-1, -1, -1),
        };
        write!(f, "LAYER\n{}\n{}\n{}\n{}\n", self.images.len(), w, h, d)?;
        for (image, visible) in self.images.iter().zip(&self.visible) {
            write!(f, "{}\n{}", visible, image)?;
        }
        Ok(())
    }
}
