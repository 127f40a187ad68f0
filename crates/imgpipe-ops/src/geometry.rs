//! Geometric resampling.

use crate::enums::Interpolation;
use crate::parallel::map_rows;
use crate::{OpsError, OpsResult};
use imgpipe_core::Image;
use tracing::{debug, trace};

/// Largest output buffer [`resize`] will allocate, in bytes.
pub const MAX_OUTPUT_BYTES: usize = 1 << 30;

/// Scales by `fx` horizontally and `fy` vertically.
///
/// Output sizes are `round(w * fx)` and `round(h * fy)`, at least 1, and
/// the output buffer is capped at [`MAX_OUTPUT_BYTES`].
///
/// # Example
///
/// ```rust
/// use imgpipe_core::Image;
/// use imgpipe_ops::enums::Interpolation;
/// use imgpipe_ops::geometry::resize;
///
/// let src = Image::new(10, 4, 3).unwrap();
/// let out = resize(&src, 0.5, 2.0, Interpolation::Linear).unwrap();
/// assert_eq!(out.dimensions(), (5, 8));
/// ```
pub fn resize(src: &Image, fx: f64, fy: f64, interpolation: Interpolation) -> OpsResult<Image> {
    trace!(fx, fy, ?interpolation, "resize");
    if !(fx > 0.0 && fx.is_finite() && fy > 0.0 && fy.is_finite()) {
        return Err(OpsError::InvalidParameter(format!(
            "scale factors must be positive, got fx={fx}, fy={fy}"
        )));
    }
    let (sw, sh) = (src.width() as usize, src.height() as usize);
    let dw = scaled_extent(src.width(), fx)?;
    let dh = scaled_extent(src.height(), fy)?;
    let c = src.channels() as usize;
    let row_len = (dw as usize)
        .checked_mul(c)
        .filter(|len| {
            len.checked_mul(dh as usize)
                .is_some_and(|total| total <= MAX_OUTPUT_BYTES)
        })
        .ok_or_else(|| {
            OpsError::InvalidParameter(format!(
                "output {dw}x{dh}x{c} exceeds {MAX_OUTPUT_BYTES} bytes"
            ))
        })?;
    let (dw, dh) = (dw as usize, dh as usize);
    let scale_x = sw as f64 / dw as f64;
    let scale_y = sh as f64 / dh as f64;
    let data = src.data();
    debug!(sw, sh, dw, dh, "Resizing");

    let out = map_rows(row_len, dh, |y, row| match interpolation {
        Interpolation::Nearest => {
            let sy = ((y as f64 * scale_y) as usize).min(sh - 1);
            for x in 0..dw {
                let sx = ((x as f64 * scale_x) as usize).min(sw - 1);
                let src_idx = (sy * sw + sx) * c;
                row[x * c..(x + 1) * c].copy_from_slice(&data[src_idx..src_idx + c]);
            }
        }
        Interpolation::Linear => {
            let src_y = ((y as f64 + 0.5) * scale_y - 0.5).clamp(0.0, (sh - 1) as f64);
            let y0 = src_y.floor() as usize;
            let y1 = (y0 + 1).min(sh - 1);
            let ty = src_y - y0 as f64;
            for x in 0..dw {
                let src_x = ((x as f64 + 0.5) * scale_x - 0.5).clamp(0.0, (sw - 1) as f64);
                let x0 = src_x.floor() as usize;
                let x1 = (x0 + 1).min(sw - 1);
                let tx = src_x - x0 as f64;
                for ch in 0..c {
                    let p = |xx: usize, yy: usize| f64::from(data[(yy * sw + xx) * c + ch]);
                    let top = p(x0, y0) * (1.0 - tx) + p(x1, y0) * tx;
                    let bottom = p(x0, y1) * (1.0 - tx) + p(x1, y1) * tx;
                    let v = top * (1.0 - ty) + bottom * ty;
                    row[x * c + ch] = v.round().clamp(0.0, 255.0) as u8;
                }
            }
        }
    });

    Ok(Image::from_data(dw as u32, dh as u32, src.channels(), out)?)
}

/// `round(extent * factor)`, at least 1, as a `u32`.
fn scaled_extent(extent: u32, factor: f64) -> OpsResult<u32> {
    let scaled = (f64::from(extent) * factor).round().max(1.0);
    if scaled > f64::from(u32::MAX) {
        return Err(OpsError::InvalidParameter(format!(
            "scaling {extent} by {factor} exceeds the maximum image size"
        )));
    }
    Ok(scaled as u32)
}
