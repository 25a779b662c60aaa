//! Fixed table of quality presets.

use std::fmt;
use std::str::FromStr;

use crate::error::PresetError;

/// A named bundle of downscale factor and page resolution.
///
/// The registry is the enum itself: variants cannot be added, removed or
/// changed at runtime, and [`QualityPreset::ALL`] lists them in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QualityPreset {
    #[default]
    High,
    Medium,
    Low,
}

impl QualityPreset {
    /// All presets, highest quality first.
    pub const ALL: [QualityPreset; 3] = [Self::High, Self::Medium, Self::Low];

    /// User-facing label, e.g. `"Medium (150 DPI)"`.
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High (300 DPI)",
            Self::Medium => "Medium (150 DPI)",
            Self::Low => "Low (72 DPI)",
        }
    }

    /// First word of the label, used on the download caption.
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    /// Fraction of the original pixel dimensions kept on each axis.
    pub const fn scale(self) -> f64 {
        match self {
            Self::High => 1.0,
            Self::Medium => 0.5,
            Self::Low => 0.25,
        }
    }

    /// Resolution tag written into every page, in dots per inch.
    pub const fn dpi(self) -> u32 {
        match self {
            Self::High => 300,
            Self::Medium => 150,
            Self::Low => 72,
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for QualityPreset {
    type Err = PresetError;

    /// Accepts either the short name (any case) or the exact label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label() == trimmed || p.short_name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| PresetError::Unknown(s.to_string()))
    }
}
