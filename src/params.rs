//! Generation options accepted by the image provider.

use std::str::FromStr;

/// Rendering style requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// Hyper-real, dramatic images.
    Vivid,
    /// More natural, less saturated images.
    Natural,
}

/// Detail level requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    /// Standard detail.
    Standard,
    /// Finer detail and consistency.
    Hd,
}

/// Output dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    /// 256x256
    Square256,
    /// 512x512
    Square512,
    /// 1024x1024
    Square1024,
    /// 1792x1024
    Landscape,
    /// 1024x1792
    Portrait,
}

impl Style {
    /// Wire value sent to the provider.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vivid => "vivid",
            Self::Natural => "natural",
        }
    }
}

impl Quality {
    /// Wire value sent to the provider.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Hd => "hd",
        }
    }
}

impl ImageSize {
    /// Wire value sent to the provider.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Square256 => "256x256",
            Self::Square512 => "512x512",
            Self::Square1024 => "1024x1024",
            Self::Landscape => "1792x1024",
            Self::Portrait => "1024x1792",
        }
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vivid" => Ok(Self::Vivid),
            "natural" => Ok(Self::Natural),
            _ => Err(format!("Unsupported style '{s}'. Valid: vivid, natural")),
        }
    }
}

impl FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Self::Standard),
            "hd" => Ok(Self::Hd),
            _ => Err(format!("Unsupported quality '{s}'. Valid: standard, hd")),
        }
    }
}

impl FromStr for ImageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "256x256" => Ok(Self::Square256),
            "512x512" => Ok(Self::Square512),
            "1024x1024" => Ok(Self::Square1024),
            "1792x1024" => Ok(Self::Landscape),
            "1024x1792" => Ok(Self::Portrait),
            _ => Err(format!(
                "Unsupported size '{s}'. Valid: 256x256, 512x512, 1024x1024, 1792x1024, 1024x1792"
            )),
        }
    }
}

/// Provider parameters applied to every generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOptions {
    /// Provider model name, e.g. `"dall-e-3"`.
    pub model: String,
    /// Rendering style.
    pub style: Style,
    /// Detail level.
    pub quality: Quality,
    /// Output dimensions.
    pub size: ImageSize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "dall-e-3".to_string(),
            style: Style::Vivid,
            quality: Quality::Hd,
            size: ImageSize::Square1024,
        }
    }
}

impl GenerationOptions {
    /// Parse options from their configured string forms.
    ///
    /// # Errors
    ///
    /// Returns an error if the model is empty or any value is not recognized.
    pub fn parse(model: &str, style: &str, quality: &str, size: &str) -> Result<Self, String> {
        if model.trim().is_empty() {
            return Err("Provider model must not be empty".to_string());
        }
        Ok(Self {
            model: model.to_string(),
            style: style.parse()?,
            quality: quality.parse()?,
            size: size.parse()?,
        })
    }
}
