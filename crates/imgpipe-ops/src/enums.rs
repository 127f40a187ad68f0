//! Enumerated option tables used by the built-in operations.
//!
//! Each table is a static [`EnumType`] whose member names and constants
//! follow the usual vision-library spelling (`BORDER_REFLECT_101`,
//! `THRESH_BINARY`, ...). The Rust enums next to them are what the pixel
//! code actually matches on.

use crate::{OpsError, OpsResult};
use imgpipe_core::{EnumType, EnumValue};

/// Pixel extrapolation at image borders.
pub static BORDER_TYPE: EnumType = EnumType::new(
    "BorderType",
    &[
        ("BORDER_DEFAULT", 4),
        ("BORDER_CONSTANT", 0),
        ("BORDER_REPLICATE", 1),
        ("BORDER_REFLECT", 2),
        ("BORDER_WRAP", 3),
        ("BORDER_REFLECT_101", 4),
    ],
);

/// Threshold comparison mode.
pub static THRESHOLD_TYPE: EnumType = EnumType::new(
    "ThresholdType",
    &[
        ("THRESH_BINARY", 0),
        ("THRESH_BINARY_INV", 1),
        ("THRESH_TRUNC", 2),
        ("THRESH_TOZERO", 3),
        ("THRESH_TOZERO_INV", 4),
    ],
);

/// Structuring element shape for morphology.
pub static MORPH_SHAPE: EnumType = EnumType::new(
    "MorphShape",
    &[("MORPH_RECT", 0), ("MORPH_CROSS", 1), ("MORPH_ELLIPSE", 2)],
);

/// Resampling filter.
pub static INTERPOLATION: EnumType = EnumType::new(
    "Interpolation",
    &[("INTER_LINEAR", 1), ("INTER_NEAREST", 0)],
);

/// Border extrapolation mode.
///
/// ```text
/// Constant:    000000|abcdefgh|000000
/// Replicate:   aaaaaa|abcdefgh|hhhhhhh
/// Reflect:     fedcba|abcdefgh|hgfedcb
/// Reflect101:  gfedcb|abcdefgh|gfedcba
/// Wrap:        cdefgh|abcdefgh|abcdefg
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderMode {
    /// Out-of-range samples read as zero.
    Constant,
    /// Clamp to the edge sample.
    Replicate,
    /// Mirror including the edge sample.
    Reflect,
    /// Periodic.
    Wrap,
    /// Mirror excluding the edge sample.
    Reflect101,
}

impl BorderMode {
    /// Maps a [`BORDER_TYPE`] member to a mode.
    pub fn from_enum(value: EnumValue) -> OpsResult<Self> {
        match value.value() {
            0 => Ok(Self::Constant),
            1 => Ok(Self::Replicate),
            2 => Ok(Self::Reflect),
            3 => Ok(Self::Wrap),
            4 => Ok(Self::Reflect101),
            _ => Err(unknown_member(value)),
        }
    }

    /// Maps an out-of-range coordinate back into `0..len`.
    ///
    /// Returns `None` for [`BorderMode::Constant`] outside the image.
    pub fn resolve(self, i: isize, len: usize) -> Option<usize> {
        let n = len as isize;
        if (0..n).contains(&i) {
            return Some(i as usize);
        }
        let j = match self {
            Self::Constant => return None,
            Self::Replicate => i.clamp(0, n - 1),
            Self::Wrap => i.rem_euclid(n),
            Self::Reflect => {
                let period = 2 * n;
                let j = i.rem_euclid(period);
                if j >= n { period - 1 - j } else { j }
            }
            Self::Reflect101 => {
                if n == 1 {
                    0
                } else {
                    let period = 2 * n - 2;
                    let j = i.rem_euclid(period);
                    if j >= n { period - j } else { j }
                }
            }
        };
        Some(j as usize)
    }
}

/// Threshold comparison mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdKind {
    /// `v > t ? max : 0`
    Binary,
    /// `v > t ? 0 : max`
    BinaryInv,
    /// `v > t ? t : v`
    Trunc,
    /// `v > t ? v : 0`
    ToZero,
    /// `v > t ? 0 : v`
    ToZeroInv,
}

impl ThresholdKind {
    /// Maps a [`THRESHOLD_TYPE`] member to a mode.
    pub fn from_enum(value: EnumValue) -> OpsResult<Self> {
        match value.value() {
            0 => Ok(Self::Binary),
            1 => Ok(Self::BinaryInv),
            2 => Ok(Self::Trunc),
            3 => Ok(Self::ToZero),
            4 => Ok(Self::ToZeroInv),
            _ => Err(unknown_member(value)),
        }
    }
}

/// Structuring element shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphShape {
    /// Full square.
    Rect,
    /// Center row and column.
    Cross,
    /// Inscribed ellipse.
    Ellipse,
}

impl MorphShape {
    /// Maps a [`MORPH_SHAPE`] member to a shape.
    pub fn from_enum(value: EnumValue) -> OpsResult<Self> {
        match value.value() {
            0 => Ok(Self::Rect),
            1 => Ok(Self::Cross),
            2 => Ok(Self::Ellipse),
            _ => Err(unknown_member(value)),
        }
    }
}

/// Resampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    /// Nearest neighbour.
    Nearest,
    /// Bilinear.
    Linear,
}

impl Interpolation {
    /// Maps an [`INTERPOLATION`] member to a filter.
    pub fn from_enum(value: EnumValue) -> OpsResult<Self> {
        match value.value() {
            0 => Ok(Self::Nearest),
            1 => Ok(Self::Linear),
            _ => Err(unknown_member(value)),
        }
    }
}

fn unknown_member(value: EnumValue) -> OpsError {
    OpsError::InvalidParameter(format!(
        "{} has no mode for constant {}",
        value.type_name(),
        value.value()
    ))
}
