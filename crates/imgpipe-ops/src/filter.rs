//! Smoothing filters.
//!
//! - [`gaussian_blur`] - separable Gaussian kernel
//! - [`box_blur`] - normalized box filter with independent width/height
//! - [`median_blur`] - per-channel median over a square window
//!
//! # Example
//!
//! ```rust
//! use imgpipe_core::Image;
//! use imgpipe_ops::enums::BorderMode;
//! use imgpipe_ops::filter::gaussian_blur;
//!
//! let src = Image::filled(16, 16, 3, 128).unwrap();
//! let blurred = gaussian_blur(&src, 5, 1.0, 0.0, BorderMode::Reflect101).unwrap();
//! assert_eq!(blurred.data(), src.data());
//! ```

use crate::enums::BorderMode;
use crate::parallel::map_rows;
use crate::{OpsError, OpsResult};
use imgpipe_core::Image;
#[allow(unused_imports)]
use tracing::{debug, trace};

/// Largest kernel extent any filter here accepts.
pub const MAX_KERNEL_SIZE: i64 = 255;

fn check_extent(what: &str, k: i64) -> OpsResult<()> {
    if k > MAX_KERNEL_SIZE {
        return Err(OpsError::InvalidParameter(format!(
            "{what} {k} exceeds the maximum of {MAX_KERNEL_SIZE}"
        )));
    }
    Ok(())
}

/// Builds a normalized 1D Gaussian kernel of odd `size`.
///
/// A non-positive `sigma` is derived from the size the way vision libraries
/// do: `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
pub fn gaussian_kernel(size: usize, sigma: f64) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let half = (size / 2) as f64;
    let denom = 2.0 * sigma * sigma;

    let mut weights: Vec<f64> = (0..size)
        .map(|i| {
            let d = i as f64 - half;
            (-(d * d) / denom).exp()
        })
        .collect();

    // Normalize
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    weights.into_iter().map(|w| w as f32).collect()
}

/// Gaussian blur with a square `ksize` window.
///
/// # Arguments
///
/// * `ksize` - Kernel size, odd and positive
/// * `sigma_x` - Horizontal sigma (derived from `ksize` when <= 0)
/// * `sigma_y` - Vertical sigma (`sigma_x` when <= 0)
/// * `border` - Border extrapolation
pub fn gaussian_blur(
    src: &Image,
    ksize: i64,
    sigma_x: f64,
    sigma_y: f64,
    border: BorderMode,
) -> OpsResult<Image> {
    trace!(ksize, sigma_x, sigma_y, ?border, "gaussian_blur");
    if ksize <= 0 || ksize % 2 == 0 {
        return Err(OpsError::InvalidParameter(format!(
            "ksize must be odd and positive, got {ksize}"
        )));
    }
    check_extent("ksize", ksize)?;
    let size = ksize as usize;
    let kx = gaussian_kernel(size, sigma_x);
    let ky = if sigma_y > 0.0 {
        gaussian_kernel(size, sigma_y)
    } else {
        kx.clone()
    };
    convolve_separable(src, &kx, &ky, border)
}

/// Normalized box filter of `kw x kh`.
///
/// Even sizes are allowed; the anchor sits at `k / 2`.
pub fn box_blur(src: &Image, kw: i64, kh: i64, border: BorderMode) -> OpsResult<Image> {
    trace!(kw, kh, ?border, "box_blur");
    if kw <= 0 || kh <= 0 {
        return Err(OpsError::InvalidParameter(format!(
            "box size must be positive, got {kw}x{kh}"
        )));
    }
    check_extent("box width", kw)?;
    check_extent("box height", kh)?;
    let kx = vec![1.0 / kw as f32; kw as usize];
    let ky = vec![1.0 / kh as f32; kh as usize];
    convolve_separable(src, &kx, &ky, border)
}

/// Median filter over a square `ksize` window with replicated borders.
pub fn median_blur(src: &Image, ksize: i64) -> OpsResult<Image> {
    trace!(ksize, "median_blur");
    if ksize < 3 || ksize % 2 == 0 {
        return Err(OpsError::InvalidParameter(format!(
            "ksize must be odd and greater than 1, got {ksize}"
        )));
    }
    check_extent("ksize", ksize)?;
    let (w, h) = (src.width() as usize, src.height() as usize);
    let c = src.channels() as usize;
    let half = (ksize / 2) as isize;
    let data = src.data();
    debug!(w, h, ksize, "Applying median blur");

    let out = map_rows(w * c, h, |y, row| {
        let mut window = Vec::with_capacity((ksize * ksize) as usize);
        for x in 0..w {
            for ch in 0..c {
                window.clear();
                for dy in -half..=half {
                    let sy = BorderMode::Replicate.resolve(y as isize + dy, h).unwrap_or(0);
                    for dx in -half..=half {
                        let sx = BorderMode::Replicate.resolve(x as isize + dx, w).unwrap_or(0);
                        window.push(data[(sy * w + sx) * c + ch]);
                    }
                }
                let mid = window.len() / 2;
                let (_, median, _) = window.select_nth_unstable(mid);
                row[x * c + ch] = *median;
            }
        }
    });
    Ok(Image::from_data(src.width(), src.height(), src.channels(), out)?)
}

/// Applies a horizontal then a vertical 1D kernel.
///
/// Kernels are anchored at `len / 2`. Samples outside the image follow
/// `border`; with [`BorderMode::Constant`] they contribute zero.
pub fn convolve_separable(
    src: &Image,
    kx: &[f32],
    ky: &[f32],
    border: BorderMode,
) -> OpsResult<Image> {
    if kx.is_empty() || ky.is_empty() {
        return Err(OpsError::InvalidParameter("empty kernel".into()));
    }
    let (w, h) = (src.width() as usize, src.height() as usize);
    let c = src.channels() as usize;
    let data = src.data();
    let ax = (kx.len() / 2) as isize;
    let ay = (ky.len() / 2) as isize;

    let horizontal: Vec<f32> = map_rows(w * c, h, |y, row| {
        let line = &data[y * w * c..(y + 1) * w * c];
        for x in 0..w {
            for ch in 0..c {
                let mut sum = 0.0f32;
                for (k, weight) in kx.iter().enumerate() {
                    if let Some(sx) = border.resolve(x as isize + k as isize - ax, w) {
                        sum += line[sx * c + ch] as f32 * weight;
                    }
                }
                row[x * c + ch] = sum;
            }
        }
    });

    let out: Vec<u8> = map_rows(w * c, h, |y, row| {
        for (i, dst) in row.iter_mut().enumerate() {
            let mut sum = 0.0f32;
            for (k, weight) in ky.iter().enumerate() {
                if let Some(sy) = border.resolve(y as isize + k as isize - ay, h) {
                    sum += horizontal[sy * w * c + i] * weight;
                }
            }
            *dst = sum.round().clamp(0.0, 255.0) as u8;
        }
    });

    Ok(Image::from_data(src.width(), src.height(), src.channels(), out)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn impulse() -> Image {
        Image::from_fn(9, 9, 1, |x, y| vec![if x == 4 && y == 4 { 255 } else { 0 }]).unwrap()
    }

    #[test]
    fn test_gaussian_kernel_normalized() {
        let k = gaussian_kernel(5, 1.0);
        assert_eq!(k.len(), 5);
        let sum: f32 = k.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        assert!(k[2] > k[1] && k[1] > k[0]);
        assert_relative_eq!(k[0], k[4], epsilon = 1e-6);
    }

    #[test]
    fn test_gaussian_derived_sigma() {
        let derived = gaussian_kernel(3, 0.0);
        let explicit = gaussian_kernel(3, 0.8);
        for (a, b) in derived.iter().zip(&explicit) {
            assert_relative_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_gaussian_spreads_impulse() {
        let out = gaussian_blur(&impulse(), 5, 1.0, 0.0, BorderMode::Constant).unwrap();
        let center = out.pixel(4, 4)[0];
        let side = out.pixel(5, 4)[0];
        assert!(center < 255);
        assert!(side > 0 && side < center);
        assert_eq!(out.pixel(0, 0)[0], 0);
    }

    #[test]
    fn test_gaussian_rejects_even_ksize() {
        let err = gaussian_blur(&impulse(), 4, 1.0, 0.0, BorderMode::Reflect101).unwrap_err();
        assert!(matches!(err, OpsError::InvalidParameter(_)));
    }

    #[test]
    fn test_box_blur_uniform_is_identity() {
        let src = Image::filled(6, 5, 3, 90).unwrap();
        let out = box_blur(&src, 3, 5, BorderMode::Reflect101).unwrap();
        assert_eq!(out.data(), src.data());
    }

    #[test]
    fn test_box_blur_constant_border_darkens_edges() {
        let src = Image::filled(5, 5, 1, 90).unwrap();
        let out = box_blur(&src, 3, 3, BorderMode::Constant).unwrap();
        assert_eq!(out.pixel(2, 2)[0], 90);
        assert_eq!(out.pixel(0, 0)[0], 40);
    }

    #[test]
    fn test_median_removes_salt() {
        let out = median_blur(&impulse(), 3).unwrap();
        assert!(out.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_kernels_above_maximum_rejected() {
        let src = Image::filled(4, 4, 1, 10).unwrap();
        let huge = 1_000_000_000_000_000_001;
        assert!(gaussian_blur(&src, huge, 0.0, 0.0, BorderMode::Replicate).is_err());
        assert!(median_blur(&src, huge).is_err());
        assert!(box_blur(&src, 3, MAX_KERNEL_SIZE + 1, BorderMode::Replicate).is_err());
        assert!(gaussian_blur(&src, MAX_KERNEL_SIZE, 0.0, 0.0, BorderMode::Replicate).is_ok());
    }

    #[test]
    fn test_median_rejects_bad_ksize() {
        assert!(median_blur(&impulse(), 1).is_err());
        assert!(median_blur(&impulse(), 4).is_err());
    }
}
