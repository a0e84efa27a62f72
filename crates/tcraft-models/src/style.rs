//! Thumbnail style definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Available thumbnail styles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ThumbnailStyle {
    /// Photorealistic, high-contrast, dramatic lighting
    #[default]
    Cinematic,
    /// Clean flat design with a limited palette
    Minimalist,
    /// Vibrant colors, bold outlines, exaggerated features
    Cartoonish,
    /// 80s/90s aesthetic with neon and VHS texture
    Retro,
}

impl ThumbnailStyle {
    /// All available styles.
    pub const ALL: &'static [ThumbnailStyle] = &[
        ThumbnailStyle::Cinematic,
        ThumbnailStyle::Minimalist,
        ThumbnailStyle::Cartoonish,
        ThumbnailStyle::Retro,
    ];

    /// Returns the style name as used in API payloads and filenames.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThumbnailStyle::Cinematic => "cinematic",
            ThumbnailStyle::Minimalist => "minimalist",
            ThumbnailStyle::Cartoonish => "cartoonish",
            ThumbnailStyle::Retro => "retro",
        }
    }

    /// Parse leniently: unrecognized input falls back to Cinematic.
    ///
    /// Used at API boundaries where a bad style tag must not reject the
    /// whole request.
    pub fn parse_lossy(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl fmt::Display for ThumbnailStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ThumbnailStyle {
    type Err = StyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cinematic" => Ok(ThumbnailStyle::Cinematic),
            "minimalist" => Ok(ThumbnailStyle::Minimalist),
            "cartoonish" => Ok(ThumbnailStyle::Cartoonish),
            "retro" => Ok(ThumbnailStyle::Retro),
            _ => Err(StyleParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown thumbnail style: {0}")]
pub struct StyleParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_parse() {
        assert_eq!(
            "cinematic".parse::<ThumbnailStyle>().unwrap(),
            ThumbnailStyle::Cinematic
        );
        assert_eq!(
            "RETRO".parse::<ThumbnailStyle>().unwrap(),
            ThumbnailStyle::Retro
        );
        assert!("vaporwave".parse::<ThumbnailStyle>().is_err());
    }

    #[test]
    fn test_parse_lossy_falls_back_to_cinematic() {
        assert_eq!(
            ThumbnailStyle::parse_lossy("vaporwave"),
            ThumbnailStyle::Cinematic
        );
        assert_eq!(ThumbnailStyle::parse_lossy(""), ThumbnailStyle::Cinematic);
        assert_eq!(
            ThumbnailStyle::parse_lossy("minimalist"),
            ThumbnailStyle::Minimalist
        );
    }

    #[test]
    fn test_style_display() {
        assert_eq!(ThumbnailStyle::Cartoonish.to_string(), "cartoonish");
    }
}
