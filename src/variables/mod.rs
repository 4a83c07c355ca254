//! Variables module
//!
//! This module resolves the placeholders found in parsed requests:
//! file, environment and system variables ([`substitution`], [`system`]),
//! response chaining ([`response`]) and reference analysis ([`references`]).

pub mod json_path;
pub mod references;
pub mod response;
pub mod substitution;
pub mod system;

pub use references::{detect_circular_references, extract_references, validate_references};
pub use response::{
    contains_response_variables, extract_referenced_requests, resolve_response_variables,
    ResponseContext,
};
pub use substitution::{resolve_variables, substitute_variables, VariableContext, VariableSource};
pub use system::{resolve_system_expression, resolve_system_variable, VarError};
