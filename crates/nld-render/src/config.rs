//! Renderer configuration
//!
//! Loaded from JSON; every field is optional and falls back to the defaults.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::color::Palette;
use crate::error::RenderError;

/// What to do with colour indices and character codes outside the palette
/// and glyph table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, VariantNames, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IndexPolicy {
    /// Fail with `RenderError::InvalidIndex`.
    #[default]
    Strict,
    /// Clamp colours into 0..=15 and characters into 0..=255.
    Clamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub index_policy: IndexPolicy,
    /// Paint the cursor cell with the palette's cursor colour.
    pub highlight_cursor: bool,
    pub palette: Palette,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            index_policy: IndexPolicy::Strict,
            highlight_cursor: true,
            palette: Palette::default(),
        }
    }
}

impl RenderConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, RenderError> {
        if path.as_ref().exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use std::io::Write;

    #[test]
    fn test_empty_json_is_default() {
        let config: RenderConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert!(config.highlight_cursor);
        assert_eq!(config.index_policy, IndexPolicy::Strict);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"{{"index_policy": "clamp", "highlight_cursor": false, "palette": {{"cursor": "#ff00ff"}}}}"##
        )
        .unwrap();

        let config = RenderConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.index_policy, IndexPolicy::Clamp);
        assert!(!config.highlight_cursor);
        assert_eq!(config.palette.cursor, Color::new(0xff, 0x00, 0xff));
    }

    #[test]
    fn test_bad_palette_color() {
        let result: Result<RenderConfig, _> =
            serde_json::from_str(r##"{"palette": {"cursor": "purple"}}"##);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = RenderConfig::load_or_default("/nonexistent/nld/render.json").unwrap();
        assert_eq!(config, RenderConfig::default());
        assert!(matches!(
            RenderConfig::load_from_file("/nonexistent/nld/render.json"),
            Err(RenderError::Io(_))
        ));
    }

    #[test]
    fn test_policy_names() {
        assert_eq!("clamp".parse::<IndexPolicy>().unwrap(), IndexPolicy::Clamp);
        assert_eq!(IndexPolicy::Strict.to_string(), "strict");
    }
}
