//! Image snapshot buffer.
//!
//! [`Image`] is the unit stored in the history: an 8-bit interleaved pixel
//! buffer with 1 (gray), 3 (RGB) or 4 (RGBA) channels.
//!
//! # Memory Layout
//!
//! Pixels are stored in **row-major** order, top-to-bottom:
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//!         ...
//! ```
//!
//! # Sharing
//!
//! The sample buffer lives in an [`Arc<Vec<u8>>`]. Cloning an image shares
//! the buffer, so the same snapshot can sit in the history, in a checkpoint
//! and in a preview without copying pixels. Writers go through
//! [`make_mut`](Image::make_mut), which copies on write when the buffer is
//! shared. A stored snapshot therefore never changes underneath its holders.
//!
//! ```rust
//! use imgpipe_core::Image;
//!
//! let original = Image::filled(4, 4, 3, 10).unwrap();
//! let mut edited = original.clone();
//! assert!(edited.shares_buffer(&original));
//!
//! edited.make_mut()[0] = 255;
//! assert!(!edited.shares_buffer(&original));
//! assert_eq!(original.data()[0], 10);
//! ```

use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Rec.601 luma weights (R, G, B), as used for gray conversion.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Owned 8-bit image buffer with cheap clones.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    /// Sample buffer (Arc for cheap cloning)
    data: Arc<Vec<u8>>,
    width: u32,
    height: u32,
    channels: u32,
}

impl Image {
    /// Creates a new image filled with zeros.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for a zero width or height and
    /// [`Error::UnsupportedChannels`] for channel counts other than 1, 3, 4.
    pub fn new(width: u32, height: u32, channels: u32) -> Result<Self> {
        Self::filled(width, height, channels, 0)
    }

    /// Creates an image with every sample set to `value`.
    pub fn filled(width: u32, height: u32, channels: u32, value: u8) -> Result<Self> {
        let len = checked_len(width, height, channels)?;
        Ok(Self {
            data: Arc::new(vec![value; len]),
            width,
            height,
            channels,
        })
    }

    /// Creates an image from existing samples.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if `data.len()` is not
    /// `width * height * channels`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use imgpipe_core::Image;
    ///
    /// let img = Image::from_data(2, 1, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
    /// assert_eq!(img.pixel(1, 0), &[4, 5, 6]);
    /// ```
    pub fn from_data(width: u32, height: u32, channels: u32, data: Vec<u8>) -> Result<Self> {
        let expected = checked_len(width, height, channels)?;
        if data.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} samples, got {}", expected, data.len()),
            ));
        }
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
            channels,
        })
    }

    /// Builds an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn<F>(width: u32, height: u32, channels: u32, mut f: F) -> Result<Self>
    where
        F: FnMut(u32, u32) -> Vec<u8>,
    {
        let len = checked_len(width, height, channels)?;
        let mut data = Vec::with_capacity(len);
        for y in 0..height {
            for x in 0..width {
                let px = f(x, y);
                if px.len() != channels as usize {
                    return Err(Error::other(format!(
                        "pixel generator returned {} samples, expected {}",
                        px.len(),
                        channels
                    )));
                }
                data.extend_from_slice(&px);
            }
        }
        Self::from_data(width, height, channels, data)
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of interleaved channels.
    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// `(width, height)` tuple.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw interleaved samples.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the samples, copying the buffer first if it is
    /// shared with another image.
    pub fn make_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Consumes the image and returns its samples.
    pub fn into_data(self) -> Vec<u8> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Returns `true` if both images point at the same sample buffer.
    #[inline]
    pub fn shares_buffer(&self, other: &Image) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Samples of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds; use
    /// [`try_pixel`](Self::try_pixel) for a checked variant.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let idx = self.index(x, y);
        &self.data[idx..idx + self.channels as usize]
    }

    /// Checked pixel access.
    pub fn try_pixel(&self, x: u32, y: u32) -> Result<&[u8]> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        Ok(self.pixel(x, y))
    }

    /// Returns a single-channel luma image.
    ///
    /// Gray images are returned as a cheap clone; alpha is dropped.
    pub fn to_gray(&self) -> Image {
        if self.channels == 1 {
            return self.clone();
        }
        let c = self.channels as usize;
        let data = self
            .data
            .chunks_exact(c)
            .map(|px| {
                let v = px[0] as f32 * LUMA_WEIGHTS[0]
                    + px[1] as f32 * LUMA_WEIGHTS[1]
                    + px[2] as f32 * LUMA_WEIGHTS[2];
                v.round().clamp(0.0, 255.0) as u8
            })
            .collect();
        Image {
            data: Arc::new(data),
            width: self.width,
            height: self.height,
            channels: 1,
        }
    }

    /// Expands a gray image to `channels` by replicating the luma value.
    /// Alpha, when requested, is opaque.
    pub fn gray_to(&self, channels: u32) -> Result<Image> {
        if self.channels != 1 {
            return Err(Error::UnsupportedChannels(self.channels));
        }
        let mut data = Vec::with_capacity(self.pixel_count() * channels as usize);
        for &v in self.data.iter() {
            match channels {
                1 => data.push(v),
                3 => data.extend_from_slice(&[v, v, v]),
                4 => data.extend_from_slice(&[v, v, v, 255]),
                other => return Err(Error::UnsupportedChannels(other)),
            }
        }
        Image::from_data(self.width, self.height, channels, data)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Image({}x{}x{})", self.width, self.height, self.channels)
    }
}

fn checked_len(width: u32, height: u32, channels: u32) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::invalid_dimensions(width, height, "zero-sized image"));
    }
    if !matches!(channels, 1 | 3 | 4) {
        return Err(Error::UnsupportedChannels(channels));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels as usize))
        .ok_or_else(|| Error::invalid_dimensions(width, height, "sample count overflows"))
}
