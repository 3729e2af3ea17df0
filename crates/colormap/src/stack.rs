//! Alpha-over compositing of colored layers.

use crate::image::RgbaImage;
use terrashade_core::{Error, Result};
use tracing::debug;

/// Composite `fg` over `bg` (non-premultiplied RGBA8).
///
/// ```text
/// out_a = fa + ba * (1 - fa)
/// out_c = (fc * fa + bc * ba * (1 - fa)) / out_a
/// ```
#[inline]
pub fn blend_over(bg: [u8; 4], fg: [u8; 4]) -> [u8; 4] {
    let fa = fg[3] as f64 / 255.0;
    let ba = bg[3] as f64 / 255.0;
    let out_a = fa + ba * (1.0 - fa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let channel = |i: usize| {
        let c = (fg[i] as f64 * fa + bg[i] as f64 * ba * (1.0 - fa)) / out_a;
        c.round().clamp(0.0, 255.0) as u8
    };
    [
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

/// Stack layers bottom-to-top.
///
/// The first layer is the background and a single layer comes back
/// unchanged. All layers must share one shape.
pub fn stack<L: AsRef<RgbaImage>>(layers: &[L]) -> Result<RgbaImage> {
    let Some((first, rest)) = layers.split_first() else {
        return Err(Error::config("layers", 0, "at least one layer is required"));
    };
    let mut out = first.as_ref().clone();
    let (rows, cols) = out.shape();

    for layer in rest {
        let layer = layer.as_ref();
        let (ar, ac) = layer.shape();
        if (ar, ac) != (rows, cols) {
            return Err(Error::ShapeMismatch { er: rows, ec: cols, ar, ac });
        }
        for (dst, src) in out.pixels_mut().zip(layer.pixels()) {
            let bg = [dst[0], dst[1], dst[2], dst[3]];
            let fg = [src[0], src[1], src[2], src[3]];
            dst.copy_from_slice(&blend_over(bg, fg));
        }
    }
    debug!(layers = layers.len(), rows, cols, "stacked layers");
    Ok(out)
}
