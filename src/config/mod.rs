//! Configuration for the parser.
//!
//! Options are plain values passed to the parser entry points; there is no
//! global configuration. [`load_options`] builds them from a JSON settings
//! object, reading the `"http-file"` key and merging it over the defaults.

pub mod schema;

pub use schema::ParserOptions;

use log::warn;
use serde_json::Value;
use thiserror::Error;

/// Settings key holding parser options.
pub const SETTINGS_KEY: &str = "http-file";

/// Errors raised while loading options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The options deserialized but failed validation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The settings section did not match the option schema.
    #[error("Failed to deserialize http-file settings: {0}")]
    Deserialize(#[from] serde_json::Error),
}

/// Reads options from the `"http-file"` settings section itself.
///
/// Unlike [`load_options`], a section that does not match the schema is an
/// error rather than a fallback to the defaults.
pub fn options_from_value(section: &Value) -> Result<ParserOptions, ConfigError> {
    let options: ParserOptions = serde_json::from_value(section.clone())?;
    options.validate().map_err(ConfigError::Invalid)?;
    Ok(options)
}

/// Loads parser options from a settings object.
///
/// Settings that fail to deserialize are ignored in favour of the defaults.
/// The resulting options are validated.
///
/// # Example
///
/// ```
/// use httpfile::config::load_options;
/// use serde_json::json;
///
/// let settings = json!({
///     "http-file": {
///         "strictMode": true,
///         "maxRequestNameLength": 30
///     }
/// });
///
/// let options = load_options(Some(settings)).unwrap();
/// assert!(options.strict_mode);
/// assert_eq!(options.max_request_name_length, 30);
/// ```
pub fn load_options(settings_json: Option<Value>) -> Result<ParserOptions, ConfigError> {
    let Some(section) = settings_json.as_ref().and_then(|s| s.get(SETTINGS_KEY)) else {
        return Ok(ParserOptions::default());
    };

    match options_from_value(section) {
        Err(ConfigError::Deserialize(e)) => {
            warn!(error = e.to_string().as_str(); "Failed to parse http-file settings, using defaults");
            Ok(ParserOptions::default())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_options_with_defaults() {
        let options = load_options(None).unwrap();
        assert_eq!(options, ParserOptions::default());
    }

    #[test]
    fn test_load_options_with_user_settings() {
        let settings = json!({
            "http-file": {
                "validateRequestNames": false,
                "ignoreUnknownMetadata": false
            }
        });

        let options = load_options(Some(settings)).unwrap();
        assert!(!options.validate_request_names);
        assert!(!options.ignore_unknown_metadata);
        // Other settings should still have defaults
        assert!(options.require_request_names);
        assert_eq!(options.max_request_name_length, 50);
    }

    #[test]
    fn test_load_options_invalid_json_falls_back() {
        let settings = json!({
            "http-file": {
                "strictMode": "definitely"
            }
        });

        let options = load_options(Some(settings)).unwrap();
        assert!(!options.strict_mode);
    }

    #[test]
    fn test_load_options_validation_error() {
        let settings = json!({
            "http-file": {
                "maxRequestNameLength": 0
            }
        });

        let result = load_options(Some(settings));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("maxRequestNameLength must be greater than 0"));
    }

    #[test]
    fn test_options_from_value_is_strict() {
        let err = options_from_value(&json!({ "strictMode": "definitely" })).unwrap_err();
        assert!(matches!(err, ConfigError::Deserialize(_)));

        let options = options_from_value(&json!({ "allowEmptyBodies": false })).unwrap();
        assert!(!options.allow_empty_bodies);
        assert!(!options.strict_mode);
    }

    #[test]
    fn test_no_settings_key() {
        let settings = json!({
            "other-tool": {
                "strictMode": true
            }
        });

        let options = load_options(Some(settings)).unwrap();
        assert!(!options.strict_mode);
    }
}
