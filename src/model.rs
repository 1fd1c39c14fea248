//! Image record types exchanged with API callers.

use serde::{Deserialize, Serialize};

/// Longest prompt accepted by the create flow, in characters.
pub const MAX_PROMPT_CHARS: usize = 4000;

/// Body of a create-image request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetailCreate {
    /// Free-text prompt describing the desired image.
    pub prompt: String,
}

impl ImageDetailCreate {
    /// Check the request is something the provider can be asked for.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the prompt is blank or too long.
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("prompt must not be empty".to_string());
        }
        let chars = self.prompt.chars().count();
        if chars > MAX_PROMPT_CHARS {
            return Err(format!("prompt is {chars} characters; the limit is {MAX_PROMPT_CHARS}"));
        }
        Ok(())
    }
}

/// A stored image record: the external shape of a row in `images`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDetail {
    /// Prompt the image was generated from.
    pub prompt: String,
    /// Unique identifier assigned at creation.
    pub guid: String,
    /// Name of the image file under the images directory.
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_json_shape() {
        let detail = ImageDetail {
            prompt: "a red fox in snow".into(),
            guid: "abc".into(),
            filename: "a_red_fox_in_snow_1.png".into(),
        };
        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["prompt"], "a red fox in snow");
        assert_eq!(value["guid"], "abc");
        assert_eq!(value["filename"], "a_red_fox_in_snow_1.png");
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn create_requires_prompt_field() {
        assert!(serde_json::from_str::<ImageDetailCreate>("{}").is_err());
        let parsed: ImageDetailCreate = serde_json::from_str(r#"{"prompt":"a cat"}"#).unwrap();
        assert_eq!(parsed.prompt, "a cat");
    }

    #[test]
    fn blank_prompt_is_invalid() {
        assert!(ImageDetailCreate { prompt: "   ".into() }.validate().is_err());
        assert!(ImageDetailCreate { prompt: String::new() }.validate().is_err());
    }

    #[test]
    fn overlong_prompt_is_invalid() {
        let request = ImageDetailCreate { prompt: "a".repeat(MAX_PROMPT_CHARS + 1) };
        let err = request.validate().unwrap_err();
        assert!(err.contains("limit"));
    }

    #[test]
    fn ordinary_prompt_is_valid() {
        assert!(ImageDetailCreate { prompt: "a red fox in snow".into() }.validate().is_ok());
    }
}
