//! Per-pixel arithmetic.

use crate::{OpsError, OpsResult};
use imgpipe_core::Image;
use tracing::trace;

/// Inverts color channels (`255 - v`). Alpha is left untouched.
pub fn invert(src: &Image) -> Image {
    trace!("invert");
    let c = src.channels() as usize;
    let color = if c == 4 { 3 } else { c };
    let mut out = src.clone();
    for px in out.make_mut().chunks_exact_mut(c) {
        for v in &mut px[..color] {
            *v = 255 - *v;
        }
    }
    out
}

/// Linear mix `a * (1 - alpha) + b * alpha`.
///
/// # Errors
///
/// [`OpsError::SizeMismatch`] unless both images have the same dimensions
/// and channel count; [`OpsError::InvalidParameter`] for `alpha` outside
/// `0..=1`.
pub fn blend(a: &Image, b: &Image, alpha: f64) -> OpsResult<Image> {
    trace!(alpha, "blend");
    if a.dimensions() != b.dimensions() || a.channels() != b.channels() {
        return Err(OpsError::SizeMismatch(format!(
            "{} vs {}",
            a, b
        )));
    }
    if !(0.0..=1.0).contains(&alpha) {
        return Err(OpsError::InvalidParameter(format!(
            "alpha must be within 0..=1, got {alpha}"
        )));
    }
    let data: Vec<u8> = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(&x, &y)| {
            let v = f64::from(x) * (1.0 - alpha) + f64::from(y) * alpha;
            v.round().clamp(0.0, 255.0) as u8
        })
        .collect();
    Ok(Image::from_data(a.width(), a.height(), a.channels(), data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_keeps_alpha() {
        let src = Image::from_data(1, 1, 4, vec![0, 100, 255, 128]).unwrap();
        let out = invert(&src);
        assert_eq!(out.data(), &[255, 155, 0, 128]);
        assert_eq!(src.data(), &[0, 100, 255, 128]);
    }

    #[test]
    fn test_invert_twice_is_identity() {
        let src = Image::from_fn(3, 3, 3, |x, y| vec![x as u8, y as u8, 7]).unwrap();
        assert_eq!(invert(&invert(&src)), src);
    }

    #[test]
    fn test_blend() {
        let a = Image::filled(2, 2, 3, 0).unwrap();
        let b = Image::filled(2, 2, 3, 200).unwrap();
        let out = blend(&a, &b, 0.25).unwrap();
        assert!(out.data().iter().all(|&v| v == 50));
    }

    #[test]
    fn test_blend_rejects_mismatch() {
        let a = Image::filled(2, 2, 3, 0).unwrap();
        let b = Image::filled(3, 2, 3, 0).unwrap();
        assert!(matches!(blend(&a, &b, 0.5), Err(OpsError::SizeMismatch(_))));
        assert!(matches!(
            blend(&a, &a, 1.5),
            Err(OpsError::InvalidParameter(_))
        ));
    }
}
