//! Parser and resolver for REST Client `.http` files
//!
//! This crate turns `.http` / `.rest` files into a structured
//! [`HttpDocument`], resolves the placeholders inside them, and lints them
//! before they are sent. It never sends requests itself.
//!
//! # Architecture
//!
//! - **models**: Document tree (requests, metadata, expectations, file body
//!   references) and captured response snapshots
//! - **parser**: Line tokenizer and request assembly
//! - **variables**: File, environment and system variables, response
//!   chaining, reference extraction and cycle detection
//! - **validation**: Structural checks reported as errors and warnings
//! - **config**: Parser options and settings loading
//!
//! # Usage
//!
//! ```
//! use httpfile::models::ResponseSnapshot;
//! use httpfile::parser::parse;
//! use httpfile::validation::Validator;
//! use httpfile::variables::{resolve_response_variables, ResponseContext, VariableContext};
//!
//! let content = r#"
//! @base = https://api.example.com
//!
//! ## @name login
//! POST {{base}}/login
//! Content-Type: application/json
//!
//! {"user": "admin"}
//!
//! ###
//!
//! ## @name profile
//! ## @expect status 200
//! GET {{base}}/me
//! Authorization: Bearer {{login.response.body.$.token}}
//! "#;
//!
//! let document = parse(content).unwrap();
//! assert!(Validator::default().validate(&document).is_valid());
//!
//! let mut login = ResponseSnapshot::new(200, "OK");
//! login.set_body(r#"{"token": "abc123"}"#);
//! let mut responses = ResponseContext::new();
//! responses.insert("login", login);
//!
//! let variables = VariableContext::from_document(&document);
//! let profile = document.request("profile").unwrap();
//!
//! assert_eq!(variables.resolve(&profile.url), "https://api.example.com/me");
//! let auth = resolve_response_variables(profile.header("Authorization").unwrap(), &responses);
//! assert_eq!(auth, "Bearer abc123");
//! ```

pub mod config;
pub mod models;
pub mod parser;
pub mod validation;
pub mod variables;

pub use config::ParserOptions;
pub use models::{
    Expectation, ExpectationKind, FileBodyReference, HttpDocument, HttpMethod, HttpRequest,
    ResponseSnapshot, TextEncoding,
};
pub use parser::error::ParseError;
pub use parser::{parse, parse_file, parse_with_options, HttpFileParser};
pub use validation::{ValidationResult, Validator, ValidatorOptions};
pub use variables::{resolve_response_variables, resolve_variables, ResponseContext, VariableContext};
