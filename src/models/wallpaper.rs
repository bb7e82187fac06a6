use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tone_matrix::{FilterKind, FilterParameters};

/// Catalog entry for one wallpaper.
///
/// The pipeline only consumes `image_url`; `filters` seeds the session's
/// starting adjustments and the rest is display metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallpaper {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub image_url: String,
    #[serde(default)]
    pub thumbnail_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub photographer: String,
    /// Source resolution, e.g. "1080x1920"
    #[serde(default)]
    pub resolution: String,
    #[serde(default = "default_portrait")]
    pub is_portrait: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    /// Starting adjustments, e.g. `{ sepia: 0.4 }`
    #[serde(default, skip_serializing_if = "FilterSpec::is_empty")]
    pub filters: FilterSpec,
}

fn default_portrait() -> bool {
    true
}

impl Wallpaper {
    /// Parse `resolution` into `(width, height)`.
    pub fn dimensions_hint(&self) -> Option<(u32, u32)> {
        let (w, h) = self.resolution.trim().split_once(['x', 'X', '×'])?;
        let w = w.trim().parse().ok()?;
        let h = h.trim().parse().ok()?;
        (w > 0 && h > 0).then_some((w, h))
    }
}

/// Filter adjustments as written in config files: a map of filter name to
/// value. Unknown names are rejected; values are clamped on conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec(pub BTreeMap<String, f32>);

impl FilterSpec {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_parameters(&self) -> Result<FilterParameters, tone_matrix::UnknownFilter> {
        let mut params = FilterParameters::neutral();
        for (name, value) in &self.0 {
            let kind: FilterKind = name.parse()?;
            params = params.with(kind, *value);
        }
        Ok(params)
    }
}
