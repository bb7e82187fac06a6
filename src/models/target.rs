use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which wallpaper surface(s) a commit writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallpaperTarget {
    Home,
    Lock,
    Both,
}

impl WallpaperTarget {
    /// Concrete surfaces covered by this target, home first.
    pub fn surfaces(self) -> &'static [Surface] {
        match self {
            WallpaperTarget::Home => &[Surface::Home],
            WallpaperTarget::Lock => &[Surface::Lock],
            WallpaperTarget::Both => &[Surface::Home, Surface::Lock],
        }
    }
}

impl FromStr for WallpaperTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "home" | "home-screen" | "system" => Ok(WallpaperTarget::Home),
            "lock" | "lock-screen" => Ok(WallpaperTarget::Lock),
            "both" => Ok(WallpaperTarget::Both),
            other => Err(format!("unknown target '{other}' (expected home, lock or both)")),
        }
    }
}

impl fmt::Display for WallpaperTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WallpaperTarget::Home => "home",
            WallpaperTarget::Lock => "lock",
            WallpaperTarget::Both => "both",
        };
        f.write_str(name)
    }
}

/// A single wallpaper surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Home,
    Lock,
}

impl Surface {
    pub fn name(self) -> &'static str {
        match self {
            Surface::Home => "home",
            Surface::Lock => "lock",
        }
    }

    /// Target flag for submitting to just this surface.
    pub fn target(self) -> WallpaperTarget {
        match self {
            Surface::Home => WallpaperTarget::Home,
            Surface::Lock => WallpaperTarget::Lock,
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 2D offset in UI units, relative to the image center.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl FromStr for Vector2 {
    type Err = String;

    /// Parse `"x,y"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected 'x,y', got '{s}'"))?;
        let x = x.trim().parse().map_err(|e| format!("bad x in '{s}': {e}"))?;
        let y = y.trim().parse().map_err(|e| format!("bad y in '{s}': {e}"))?;
        Ok(Self { x, y })
    }
}

/// User pan/zoom for one surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometricTransform {
    /// Uniform zoom about the image center; 1.0 is neutral
    pub scale: f32,
    /// Pan in UI units
    #[serde(default)]
    pub offset: Vector2,
}

impl Default for GeometricTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl GeometricTransform {
    /// No zoom, no pan.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: Vector2::ZERO,
    };

    pub fn new(scale: f32, offset: Vector2) -> Self {
        Self { scale, offset }
    }

    /// True when applying this transform is a no-op.
    pub fn is_identity(&self) -> bool {
        self.scale == 1.0 && self.offset == Vector2::ZERO
    }
}
