//! Output size estimation.
//!
//! The estimate is a directional hint shown before converting. It scales the
//! input byte count linearly and makes no attempt to predict what the encoder
//! will actually produce.

use crate::preset::QualityPreset;

/// Smallest scale factor the pipeline will use.
pub const MIN_SCALE: f64 = 0.05;
/// Largest scale factor the pipeline will use.
pub const MAX_SCALE: f64 = 1.0;

/// Clamp a scale factor into `[MIN_SCALE, MAX_SCALE]`.
///
/// NaN maps to `MAX_SCALE`, which leaves images untouched.
pub fn clamp_scale(scale: f64) -> f64 {
    if scale.is_nan() {
        return MAX_SCALE;
    }
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// Rough projected document size in bytes.
pub fn estimate(total_bytes: u64, scale: f64) -> f64 {
    total_bytes as f64 * clamp_scale(scale)
}

/// One estimate per preset, in registry order.
pub fn estimate_all(total_bytes: u64) -> Vec<(QualityPreset, f64)> {
    QualityPreset::ALL
        .into_iter()
        .map(|preset| (preset, estimate(total_bytes, preset.scale())))
        .collect()
}

/// Render a byte count as `"~ 1.23 MB"`.
pub fn format_megabytes(bytes: f64) -> String {
    format!("~ {:.2} MB", bytes / (1024.0 * 1024.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clamps_low_and_high() {
        assert_eq!(clamp_scale(0.0), MIN_SCALE);
        assert_eq!(clamp_scale(-3.0), MIN_SCALE);
        assert_eq!(clamp_scale(4.0), MAX_SCALE);
        assert_eq!(clamp_scale(f64::INFINITY), MAX_SCALE);
        assert_eq!(clamp_scale(f64::NEG_INFINITY), MIN_SCALE);
        assert_eq!(clamp_scale(f64::NAN), MAX_SCALE);
        assert_eq!(clamp_scale(0.5), 0.5);
    }

    #[test]
    fn estimate_uses_preset_scale() {
        assert_eq!(estimate(1000, 0.5), 500.0);
        assert_eq!(estimate(1000, 1.0), 1000.0);
        assert_eq!(estimate(1000, 0.0), 50.0);
        assert_eq!(estimate(0, 0.25), 0.0);
        assert_eq!(estimate(3, -1.0), 3.0 * 0.05);
    }

    #[test]
    fn estimate_all_follows_registry() {
        let all = estimate_all(4096);
        assert_eq!(all.len(), 3);
        assert_eq!(all[0], (QualityPreset::High, 4096.0));
        assert_eq!(all[1], (QualityPreset::Medium, 2048.0));
        assert_eq!(all[2], (QualityPreset::Low, 1024.0));
    }

    #[test]
    fn megabyte_formatting() {
        assert_eq!(format_megabytes(0.0), "~ 0.00 MB");
        assert_eq!(format_megabytes(1024.0 * 1024.0 * 1.5), "~ 1.50 MB");
    }

    proptest! {
        #[test]
        fn estimate_matches_clamped_product(b in 0u64..1_000_000_000, s in -2.0f64..3.0) {
            let expected = b as f64 * s.clamp(0.05, 1.0);
            let got = estimate(b, s);
            prop_assert_eq!(got, expected);
            prop_assert!(got >= 0.0);
        }
    }
}
