//! Fixed-level thresholding.
//!
//! The input is reduced to luma first. Color inputs come back as 3-channel
//! gray so the result can feed the next color operation directly; gray
//! inputs stay single-channel.

use crate::enums::ThresholdKind;
use crate::parallel::map_rows;
use crate::OpsResult;
use imgpipe_core::Image;
use tracing::trace;

/// Applies `kind` with level `thresh` and ceiling `maxval`.
pub fn threshold(src: &Image, thresh: f64, maxval: f64, kind: ThresholdKind) -> OpsResult<Image> {
    trace!(thresh, maxval, ?kind, "threshold");
    let gray = src.to_gray();
    let max = maxval.round().clamp(0.0, 255.0) as u8;
    let trunc = thresh.floor().clamp(0.0, 255.0) as u8;
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let data = gray.data();

    let out = map_rows(w, h, |y, row| {
        for (x, dst) in row.iter_mut().enumerate() {
            let v = data[y * w + x];
            let above = f64::from(v) > thresh;
            *dst = match kind {
                ThresholdKind::Binary => if above { max } else { 0 },
                ThresholdKind::BinaryInv => if above { 0 } else { max },
                ThresholdKind::Trunc => if above { trunc } else { v },
                ThresholdKind::ToZero => if above { v } else { 0 },
                ThresholdKind::ToZeroInv => if above { 0 } else { v },
            };
        }
    });

    let result = Image::from_data(gray.width(), gray.height(), 1, out)?;
    if src.channels() == 1 {
        Ok(result)
    } else {
        Ok(result.gray_to(3)?)
    }
}
