//! Morphological dilation and erosion.
//!
//! Dilation takes the per-channel maximum over the structuring element,
//! erosion the minimum. Neighbours outside the image are skipped, so edges
//! never pull values in from outside.

use crate::enums::MorphShape;
use crate::filter::MAX_KERNEL_SIZE;
use crate::parallel::map_rows;
use crate::{OpsError, OpsResult};
use imgpipe_core::Image;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Square boolean mask anchored at its center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    size: usize,
    mask: Vec<bool>,
}

impl StructuringElement {
    /// Builds an element of `shape` with side `size`.
    pub fn new(shape: MorphShape, size: usize) -> OpsResult<Self> {
        if size == 0 {
            return Err(OpsError::InvalidParameter(
                "structuring element size must be positive".into(),
            ));
        }
        if size as u64 > MAX_KERNEL_SIZE as u64 {
            return Err(OpsError::InvalidParameter(format!(
                "structuring element size {size} exceeds the maximum of {MAX_KERNEL_SIZE}"
            )));
        }
        let anchor = size / 2;
        let mut mask = vec![false; size * size];
        match shape {
            MorphShape::Rect => mask.iter_mut().for_each(|m| *m = true),
            MorphShape::Cross => {
                for i in 0..size {
                    mask[anchor * size + i] = true;
                    mask[i * size + anchor] = true;
                }
            }
            MorphShape::Ellipse => {
                let r = (size / 2) as f64;
                for row in 0..size {
                    let dy = row as f64 - r;
                    if dy.abs() > r {
                        continue;
                    }
                    let dx = if r > 0.0 {
                        (r * ((r * r - dy * dy) / (r * r)).sqrt()).round() as isize
                    } else {
                        0
                    };
                    let start = (anchor as isize - dx).max(0) as usize;
                    let end = ((anchor as isize + dx + 1) as usize).min(size);
                    for col in start..end {
                        mask[row * size + col] = true;
                    }
                }
            }
        }
        Ok(Self { size, mask })
    }

    /// Side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether offset `(col, row)` inside the element is set.
    #[inline]
    pub fn contains(&self, col: usize, row: usize) -> bool {
        self.mask[row * self.size + col]
    }

    fn offsets(&self) -> Vec<(isize, isize)> {
        let a = (self.size / 2) as isize;
        (0..self.size)
            .flat_map(|row| (0..self.size).map(move |col| (col, row)))
            .filter(|&(col, row)| self.contains(col, row))
            .map(|(col, row)| (col as isize - a, row as isize - a))
            .collect()
    }
}

/// Dilates `iterations` times.
pub fn dilate(src: &Image, element: &StructuringElement, iterations: i64) -> OpsResult<Image> {
    trace!(size = element.size(), iterations, "dilate");
    morph(src, element, iterations, u8::max)
}

/// Erodes `iterations` times.
pub fn erode(src: &Image, element: &StructuringElement, iterations: i64) -> OpsResult<Image> {
    trace!(size = element.size(), iterations, "erode");
    morph(src, element, iterations, u8::min)
}

fn morph(
    src: &Image,
    element: &StructuringElement,
    iterations: i64,
    pick: fn(u8, u8) -> u8,
) -> OpsResult<Image> {
    if iterations < 0 {
        return Err(OpsError::InvalidParameter(format!(
            "iterations must be non-negative, got {iterations}"
        )));
    }
    let offsets = element.offsets();
    let mut current = src.clone();
    for _ in 0..iterations {
        current = morph_once(&current, &offsets, pick)?;
    }
    Ok(current)
}

fn morph_once(src: &Image, offsets: &[(isize, isize)], pick: fn(u8, u8) -> u8) -> OpsResult<Image> {
    let (w, h) = (src.width() as usize, src.height() as usize);
    let c = src.channels() as usize;
    let data = src.data();

    let out = map_rows(w * c, h, |y, row| {
        for x in 0..w {
            for ch in 0..c {
                let mut acc = data[(y * w + x) * c + ch];
                for &(dx, dy) in offsets {
                    let sx = x as isize + dx;
                    let sy = y as isize + dy;
                    if sx < 0 || sy < 0 || sx >= w as isize || sy >= h as isize {
                        continue;
                    }
                    acc = pick(acc, data[(sy as usize * w + sx as usize) * c + ch]);
                }
                row[x * c + ch] = acc;
            }
        }
    });
    Ok(Image::from_data(src.width(), src.height(), src.channels(), out)?)
}
