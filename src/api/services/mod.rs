//! Backend Services
//!
//! Thin endpoint callers grouped by resource. Each function maps to exactly
//! one backend endpoint and returns the raw [`ApiOutcome`](super::ApiOutcome);
//! interpreting failures is left to the pages.

pub mod me;
pub mod notes;
pub mod tenants;

/// Encode a single path segment
fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}
