//! Parser option schema.
//!
//! This module defines the options controlling how `.http` content is parsed,
//! their defaults, and their validation.

use crate::validation::ValidatorOptions;
use serde::{Deserialize, Serialize};

/// Options controlling the parser.
///
/// Every option can be set from JSON settings using camelCase keys. Missing
/// keys take their default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserOptions {
    /// Fail parsing when two requests share a name.
    ///
    /// When disabled, duplicates are kept and lookups by name return the
    /// first one. Defaults to true.
    #[serde(default = "default_true")]
    pub validate_request_names: bool,

    /// Treat placeholders as meaningful.
    ///
    /// The parser never resolves placeholders itself. When disabled, `<@`
    /// file body directives are recorded without variable processing and
    /// strict mode skips the variable cycle check. Defaults to true.
    #[serde(default = "default_true")]
    pub process_variables: bool,

    /// Run the validator after parsing and fail on any validation error.
    ///
    /// Also turns off name slugification, so a malformed name surfaces as
    /// an error instead of being repaired. Defaults to false.
    #[serde(default)]
    pub strict_mode: bool,

    /// Interpret `# @expect` directives. Defaults to true.
    #[serde(default = "default_true")]
    pub parse_expectations: bool,

    /// Synthesize `request-N` names for requests without one.
    ///
    /// When disabled, such requests keep an empty name, which the validator
    /// reports. Defaults to true.
    #[serde(default = "default_true")]
    pub require_request_names: bool,

    /// Accept POST/PUT/PATCH requests without any body. Defaults to true.
    #[serde(default = "default_true")]
    pub allow_empty_bodies: bool,

    /// Collapse CR/LF variants to LF and strip a byte-order mark before
    /// tokenizing. Defaults to true.
    #[serde(default = "default_true")]
    pub normalize_line_endings: bool,

    /// Maximum request name length. Defaults to 50.
    ///
    /// Must be greater than 0.
    #[serde(default = "default_max_request_name_length")]
    pub max_request_name_length: usize,

    /// Drop unrecognized `# @key` directives instead of keeping them in the
    /// request metadata. Defaults to true.
    #[serde(default = "default_true")]
    pub ignore_unknown_metadata: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            validate_request_names: true,
            process_variables: true,
            strict_mode: false,
            parse_expectations: true,
            require_request_names: true,
            allow_empty_bodies: true,
            normalize_line_endings: true,
            max_request_name_length: default_max_request_name_length(),
            ignore_unknown_metadata: true,
        }
    }
}

impl ParserOptions {
    /// Default options with strict mode turned on.
    pub fn strict() -> Self {
        Self {
            strict_mode: true,
            ..Self::default()
        }
    }

    /// Validates the options.
    ///
    /// # Returns
    ///
    /// `Ok(())` if all settings are valid, or `Err` with a descriptive error message.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_request_name_length == 0 {
            return Err("maxRequestNameLength must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Options for the validator run by strict mode.
    pub fn validator_options(&self) -> ValidatorOptions {
        ValidatorOptions {
            max_request_name_length: self.max_request_name_length,
            allow_empty_bodies: self.allow_empty_bodies,
            check_variable_cycles: self.process_variables,
        }
    }
}

// Default value functions for serde

fn default_true() -> bool {
    true
}

fn default_max_request_name_length() -> usize {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ParserOptions::default();
        assert!(options.validate_request_names);
        assert!(options.process_variables);
        assert!(!options.strict_mode);
        assert!(options.parse_expectations);
        assert!(options.require_request_names);
        assert!(options.allow_empty_bodies);
        assert!(options.normalize_line_endings);
        assert_eq!(options.max_request_name_length, 50);
        assert!(options.ignore_unknown_metadata);
    }

    #[test]
    fn test_strict_options() {
        let options = ParserOptions::strict();
        assert!(options.strict_mode);
        assert!(options.validate_request_names);
    }

    #[test]
    fn test_validation_zero_name_length() {
        let options = ParserOptions {
            max_request_name_length: 0,
            ..Default::default()
        };
        assert_eq!(
            options.validate().unwrap_err(),
            "maxRequestNameLength must be greater than 0"
        );
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let options: ParserOptions =
            serde_json::from_str(r#"{"strictMode": true, "maxRequestNameLength": 20}"#).unwrap();
        assert!(options.strict_mode);
        assert_eq!(options.max_request_name_length, 20);
        assert!(options.require_request_names);
    }

    #[test]
    fn test_validator_options_follow_parser_options() {
        let options = ParserOptions {
            process_variables: false,
            allow_empty_bodies: false,
            max_request_name_length: 12,
            ..Default::default()
        };
        let validator = options.validator_options();
        assert_eq!(validator.max_request_name_length, 12);
        assert!(!validator.allow_empty_bodies);
        assert!(!validator.check_variable_cycles);
    }
}
