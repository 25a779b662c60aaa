//! Downscaling bitmaps for a quality preset.

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use log::debug;

use crate::estimate::{clamp_scale, MAX_SCALE};
use crate::loader::Bitmap;

/// Target size for one axis: `max(1, round(dim * scale))`.
pub fn scaled_dimension(dim: u32, scale: f64) -> u32 {
    let scaled = (dim as f64 * scale).round();
    (scaled as u32).max(1)
}

/// Target pixel dimensions for a bitmap at a scale, after clamping.
pub fn target_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let scale = clamp_scale(scale);
    if scale >= MAX_SCALE {
        return (width, height);
    }
    (scaled_dimension(width, scale), scaled_dimension(height, scale))
}

/// Downscale a bitmap, or hand it back untouched when `scale >= 1.0`.
///
/// The input is never modified; a resized copy is returned as `Cow::Owned`.
pub fn resample(bitmap: &Bitmap, scale: f64) -> Cow<'_, Bitmap> {
    let scale = clamp_scale(scale);
    if scale >= MAX_SCALE {
        return Cow::Borrowed(bitmap);
    }

    let (target_width, target_height) = target_dimensions(bitmap.width(), bitmap.height(), scale);
    debug!(
        "Resampling {} from {}x{} to {}x{}",
        bitmap.name(),
        bitmap.width(),
        bitmap.height(),
        target_width,
        target_height
    );

    let resized = imageops::resize(
        bitmap.pixels(),
        target_width,
        target_height,
        FilterType::Lanczos3,
    );
    Cow::Owned(Bitmap::new(bitmap.name(), resized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use proptest::prelude::*;

    fn bitmap(w: u32, h: u32) -> Bitmap {
        Bitmap::new("test.png", RgbImage::from_pixel(w, h, Rgb([128, 64, 32])))
    }

    #[test]
    fn full_scale_borrows_input() {
        let input = bitmap(40, 30);
        let out = resample(&input, 1.0);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!((out.width(), out.height()), (40, 30));
    }

    #[test]
    fn above_one_is_clamped_to_passthrough() {
        let input = bitmap(40, 30);
        assert!(matches!(resample(&input, 2.5), Cow::Borrowed(_)));
    }

    #[test]
    fn half_scale() {
        let input = bitmap(1000, 800);
        let out = resample(&input, 0.5);
        assert_eq!((out.width(), out.height()), (500, 400));
        // original untouched
        assert_eq!((input.width(), input.height()), (1000, 800));
    }

    #[test]
    fn tiny_input_never_collapses() {
        let small = bitmap(2, 2);
        let out = resample(&small, 0.25);
        assert_eq!((out.width(), out.height()), (1, 1));

        let single = bitmap(1, 1);
        let out = resample(&single, 0.05);
        assert_eq!((out.width(), out.height()), (1, 1));
    }

    #[test]
    fn axes_round_independently() {
        assert_eq!(target_dimensions(101, 3, 0.5), (51, 2));
        assert_eq!(target_dimensions(10, 10, 0.0), (1, 1));
    }

    #[test]
    fn uniform_color_survives_filter() {
        let input = bitmap(64, 64);
        let out = resample(&input, 0.25);
        let px = out.pixels().get_pixel(8, 8);
        for (got, want) in px.0.iter().zip([128u8, 64, 32]) {
            assert!(got.abs_diff(want) <= 1, "{:?}", px);
        }
    }

    #[test]
    fn keeps_name() {
        let input = bitmap(10, 10);
        let out = resample(&input, 0.5);
        assert_eq!(out.name(), "test.png");
    }

    proptest! {
        #[test]
        fn dimensions_are_at_least_one(w in 1u32..5000, h in 1u32..5000, s in -1.0f64..2.0) {
            let (tw, th) = target_dimensions(w, h, s);
            prop_assert!(tw >= 1 && th >= 1);
            prop_assert!(tw <= w && th <= h);
        }
    }
}
