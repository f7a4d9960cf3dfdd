//! Style state and construction-time attributes.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::RgbaColor;

/// Attribute parsing errors.
#[derive(Debug, Error)]
pub enum AttributeError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid attributes: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the host would scale image content into the view bounds.
///
/// The circular view only ever uses [`ScaleType::CenterCrop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScaleType {
    Matrix,
    FitXy,
    FitStart,
    FitCenter,
    FitEnd,
    Center,
    CenterCrop,
    CenterInside,
}

impl fmt::Display for ScaleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScaleType::Matrix => "MATRIX",
            ScaleType::FitXy => "FIT_XY",
            ScaleType::FitStart => "FIT_START",
            ScaleType::FitCenter => "FIT_CENTER",
            ScaleType::FitEnd => "FIT_END",
            ScaleType::Center => "CENTER",
            ScaleType::CenterCrop => "CENTER_CROP",
            ScaleType::CenterInside => "CENTER_INSIDE",
        };
        f.write_str(name)
    }
}

/// Border, fill and padding of the circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircleStyle {
    /// Border stroke width in pixels.
    pub border_width: u32,
    pub border_color: RgbaColor,
    /// Painted behind the image; only visible through transparent pixels.
    pub fill_color: RgbaColor,
    /// Extra inset of the image circle inside the drawable circle.
    pub circle_padding: u32,
    /// Draw the border over the image instead of shrinking the image.
    pub border_overlay: bool,
    /// Skip the circle entirely and draw the image like a plain image view.
    pub disable_circular_transformation: bool,
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self {
            border_width: 0,
            border_color: RgbaColor::BLACK,
            fill_color: RgbaColor::TRANSPARENT,
            circle_padding: 0,
            border_overlay: false,
            disable_circular_transformation: false,
        }
    }
}

/// Drop shadow configuration.
///
/// Only the offsets have an effect: when enabled they shrink the space
/// available to the circle. No shadow layer is ever painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowStyle {
    pub enabled: bool,
    pub color: RgbaColor,
    pub radius: f32,
    /// Horizontal offset in density-independent units.
    pub dx: f32,
    /// Vertical offset in density-independent units.
    pub dy: f32,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            enabled: false,
            color: RgbaColor::BLACK,
            radius: 2.0,
            dx: 0.0,
            dy: 2.0,
        }
    }
}

/// Construction-time configuration, as written in a layout/attributes file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Attributes {
    pub border_width: u32,
    pub circle_padding: u32,
    pub border_color: RgbaColor,
    pub border_overlay: bool,
    pub fill_color: RgbaColor,
    pub enable_shadow: bool,
    pub shadow_color: RgbaColor,
    pub shadow_dx: f32,
    pub shadow_dy: f32,
}

impl Default for Attributes {
    fn default() -> Self {
        let style = CircleStyle::default();
        let shadow = ShadowStyle::default();
        Self {
            border_width: style.border_width,
            circle_padding: style.circle_padding,
            border_color: style.border_color,
            border_overlay: style.border_overlay,
            fill_color: style.fill_color,
            enable_shadow: shadow.enabled,
            shadow_color: shadow.color,
            shadow_dx: shadow.dx,
            shadow_dy: shadow.dy,
        }
    }
}

impl Attributes {
    /// Parse attributes from JSON; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, AttributeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load attributes from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AttributeError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, AttributeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// The circle style these attributes describe.
    pub fn circle_style(&self) -> CircleStyle {
        CircleStyle {
            border_width: self.border_width,
            border_color: self.border_color,
            fill_color: self.fill_color,
            circle_padding: self.circle_padding,
            border_overlay: self.border_overlay,
            disable_circular_transformation: false,
        }
    }

    /// The shadow configuration these attributes describe.
    pub fn shadow_style(&self) -> ShadowStyle {
        ShadowStyle {
            enabled: self.enable_shadow,
            color: self.shadow_color,
            dx: self.shadow_dx,
            dy: self.shadow_dy,
            ..ShadowStyle::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let attrs = Attributes::default();
        assert_eq!(attrs.border_width, 0);
        assert_eq!(attrs.circle_padding, 0);
        assert_eq!(attrs.border_color, RgbaColor::BLACK);
        assert!(!attrs.border_overlay);
        assert_eq!(attrs.fill_color, RgbaColor::TRANSPARENT);
        assert!(!attrs.enable_shadow);
        assert_eq!(attrs.shadow_dx, 0.0);
        assert_eq!(attrs.shadow_dy, 2.0);
    }

    #[test]
    fn test_from_json_partial() {
        let attrs = Attributes::from_json(
            r##"{ "borderWidth": 4, "borderColor": "#FFFF0000", "shadowDy": 3.5 }"##,
        )
        .unwrap();
        assert_eq!(attrs.border_width, 4);
        assert_eq!(attrs.border_color, RgbaColor::rgb(255, 0, 0));
        assert_eq!(attrs.shadow_dy, 3.5);
        assert_eq!(attrs.fill_color, RgbaColor::TRANSPARENT);
    }

    #[test]
    fn test_from_json_bad_color() {
        let err = Attributes::from_json(r#"{ "fillColor": "red" }"#).unwrap_err();
        assert!(matches!(err, AttributeError::Json(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.json");
        let attrs = Attributes {
            border_width: 6,
            border_overlay: true,
            ..Attributes::default()
        };
        fs::write(&path, attrs.to_json().unwrap()).unwrap();

        assert_eq!(Attributes::load(&path).unwrap(), attrs);
    }

    #[test]
    fn test_style_projection() {
        let attrs = Attributes {
            enable_shadow: true,
            shadow_dx: 1.0,
            circle_padding: 3,
            ..Attributes::default()
        };
        let shadow = attrs.shadow_style();
        assert!(shadow.enabled);
        assert_eq!(shadow.dx, 1.0);
        assert_eq!(shadow.radius, 2.0);
        assert_eq!(attrs.circle_style().circle_padding, 3);
    }

    #[test]
    fn test_scale_type_display() {
        assert_eq!(ScaleType::FitXy.to_string(), "FIT_XY");
        assert_eq!(ScaleType::CenterCrop.to_string(), "CENTER_CROP");
    }
}
