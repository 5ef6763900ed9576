//! Request validation
//!
//! Request bodies are deserialized into typed structs deriving
//! `validator::Validate`; the [`ValidatedJson`] extractor runs the rules
//! before any business logic.

pub mod extractor;
pub mod validators;

pub use extractor::ValidatedJson;
