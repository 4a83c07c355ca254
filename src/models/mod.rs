//! Data models for parsed `.http` files.
//!
//! This module contains the document tree produced by the parser and the
//! response snapshots consumed by the response resolver.

pub mod document;
pub mod expectation;
pub mod file_body;
pub mod request;
pub mod response;

pub use document::HttpDocument;
pub use expectation::{Expectation, ExpectationKind};
pub use file_body::{FileBodyReference, TextEncoding};
pub use request::{HttpMethod, HttpRequest, RequestMetadata};
pub use response::ResponseSnapshot;
