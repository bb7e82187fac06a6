//! Filter parameters and filter kinds.
//!
//! [`FilterParameters`] is an immutable value holding every user-tunable
//! adjustment. Each field is clamped to its range on construction, so a
//! value of this type is always valid and can be used directly as a
//! memoization key for derived color matrices.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// The adjustable filters, in declaration order.
///
/// Special effects (sepia through black-and-white) are blended into the
/// color matrix in this order. Vignette is not part of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Brightness,
    Contrast,
    Saturation,
    Sepia,
    Vintage,
    CoolTone,
    WarmTone,
    BlackAndWhite,
    Vignette,
}

impl FilterKind {
    /// All filter kinds in declaration order.
    pub const ALL: [FilterKind; 9] = [
        FilterKind::Brightness,
        FilterKind::Contrast,
        FilterKind::Saturation,
        FilterKind::Sepia,
        FilterKind::Vintage,
        FilterKind::CoolTone,
        FilterKind::WarmTone,
        FilterKind::BlackAndWhite,
        FilterKind::Vignette,
    ];

    /// Special effects blended into the matrix, in composition order.
    pub const EFFECTS: [FilterKind; 5] = [
        FilterKind::Sepia,
        FilterKind::Vintage,
        FilterKind::CoolTone,
        FilterKind::WarmTone,
        FilterKind::BlackAndWhite,
    ];

    /// Valid range for this filter's intensity.
    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            FilterKind::Brightness | FilterKind::Contrast => 0.3..=3.0,
            FilterKind::Saturation => 0.0..=3.0,
            _ => 0.0..=1.0,
        }
    }

    /// Value at which this filter has no visible effect.
    pub fn neutral(self) -> f32 {
        match self {
            FilterKind::Brightness | FilterKind::Contrast | FilterKind::Saturation => 1.0,
            _ => 0.0,
        }
    }

    /// Stable lowercase name used in config files and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            FilterKind::Brightness => "brightness",
            FilterKind::Contrast => "contrast",
            FilterKind::Saturation => "saturation",
            FilterKind::Sepia => "sepia",
            FilterKind::Vintage => "vintage",
            FilterKind::CoolTone => "cool",
            FilterKind::WarmTone => "warm",
            FilterKind::BlackAndWhite => "black-and-white",
            FilterKind::Vignette => "vignette",
        }
    }

    /// Clamp `value` into this filter's range. Non-finite input maps to neutral.
    pub fn clamp(self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.neutral();
        }
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown filter name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilter(pub String);

impl fmt::Display for UnknownFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown filter: {}", self.0)
    }
}

impl std::error::Error for UnknownFilter {}

impl FromStr for FilterKind {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "brightness" => Ok(FilterKind::Brightness),
            "contrast" => Ok(FilterKind::Contrast),
            "saturation" => Ok(FilterKind::Saturation),
            "sepia" => Ok(FilterKind::Sepia),
            "vintage" => Ok(FilterKind::Vintage),
            "cool" | "cool-tone" => Ok(FilterKind::CoolTone),
            "warm" | "warm-tone" => Ok(FilterKind::WarmTone),
            "black-and-white" | "bw" | "blackandwhite" => Ok(FilterKind::BlackAndWhite),
            "vignette" => Ok(FilterKind::Vignette),
            _ => Err(UnknownFilter(s.to_string())),
        }
    }
}

/// Immutable set of filter adjustments.
///
/// # Example
///
/// ```
/// use tone_matrix::{FilterKind, FilterParameters};
///
/// let params = FilterParameters::neutral()
///     .with(FilterKind::Sepia, 0.5)
///     .with_brightness(9.0);
///
/// assert_eq!(params.get(FilterKind::Sepia), 0.5);
/// assert_eq!(params.brightness(), 3.0); // clamped
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParameters {
    brightness: f32,
    contrast: f32,
    saturation: f32,
    sepia: f32,
    vintage: f32,
    cool_tone: f32,
    warm_tone: f32,
    black_and_white: f32,
    vignette: f32,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self::neutral()
    }
}

impl FilterParameters {
    /// Parameters with every filter at its neutral value.
    pub const fn neutral() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            sepia: 0.0,
            vintage: 0.0,
            cool_tone: 0.0,
            warm_tone: 0.0,
            black_and_white: 0.0,
            vignette: 0.0,
        }
    }

    /// Build parameters from `(kind, value)` pairs; later pairs win.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (FilterKind, f32)>,
    {
        pairs
            .into_iter()
            .fold(Self::neutral(), |params, (kind, value)| params.with(kind, value))
    }

    /// Current value of one filter.
    pub fn get(&self, kind: FilterKind) -> f32 {
        match kind {
            FilterKind::Brightness => self.brightness,
            FilterKind::Contrast => self.contrast,
            FilterKind::Saturation => self.saturation,
            FilterKind::Sepia => self.sepia,
            FilterKind::Vintage => self.vintage,
            FilterKind::CoolTone => self.cool_tone,
            FilterKind::WarmTone => self.warm_tone,
            FilterKind::BlackAndWhite => self.black_and_white,
            FilterKind::Vignette => self.vignette,
        }
    }

    /// Return a copy with one filter replaced (clamped to its range).
    #[must_use]
    pub fn with(self, kind: FilterKind, value: f32) -> Self {
        let value = kind.clamp(value);
        let mut next = self;
        match kind {
            FilterKind::Brightness => next.brightness = value,
            FilterKind::Contrast => next.contrast = value,
            FilterKind::Saturation => next.saturation = value,
            FilterKind::Sepia => next.sepia = value,
            FilterKind::Vintage => next.vintage = value,
            FilterKind::CoolTone => next.cool_tone = value,
            FilterKind::WarmTone => next.warm_tone = value,
            FilterKind::BlackAndWhite => next.black_and_white = value,
            FilterKind::Vignette => next.vignette = value,
        }
        next
    }

    #[must_use]
    pub fn with_brightness(self, value: f32) -> Self {
        self.with(FilterKind::Brightness, value)
    }

    #[must_use]
    pub fn with_contrast(self, value: f32) -> Self {
        self.with(FilterKind::Contrast, value)
    }

    #[must_use]
    pub fn with_saturation(self, value: f32) -> Self {
        self.with(FilterKind::Saturation, value)
    }

    #[must_use]
    pub fn with_sepia(self, value: f32) -> Self {
        self.with(FilterKind::Sepia, value)
    }

    #[must_use]
    pub fn with_vignette(self, value: f32) -> Self {
        self.with(FilterKind::Vignette, value)
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    pub fn vignette(&self) -> f32 {
        self.vignette
    }

    /// True when no filter deviates from its neutral value.
    pub fn is_neutral(&self) -> bool {
        FilterKind::ALL
            .iter()
            .all(|&kind| self.get(kind) == kind.neutral())
    }

    /// Active special effects with their intensity, in composition order.
    pub fn active_effects(&self) -> impl Iterator<Item = (FilterKind, f32)> + '_ {
        FilterKind::EFFECTS
            .iter()
            .map(move |&kind| (kind, self.get(kind)))
            .filter(|&(_, intensity)| intensity > 0.0)
    }
}
