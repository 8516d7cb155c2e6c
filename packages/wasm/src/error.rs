//! Error types for the layout engine.
//!
//! Only configuration and construction can fail. Degenerate geometry and
//! invalid interactions (self-toggles, unknown ids) are handled as no-ops
//! and never reach this type.

use thiserror::Error;

/// Root error type for layout failures.
#[derive(Error, Debug)]
pub enum LayoutError {
    /// A simulation or force parameter is out of range.
    #[error("invalid config: {field} {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A node with the same identity already exists.
    #[error("duplicate node id: {0}")]
    DuplicateNode(String),

    /// Data crossing the JS boundary could not be converted.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LayoutError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

impl From<serde_wasm_bindgen::Error> for LayoutError {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type LayoutResult<T> = Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_message() {
        let err = LayoutError::invalid("alpha_min", "must be in (0, 1), got 2");
        assert_eq!(
            err.to_string(),
            "invalid config: alpha_min must be in (0, 1), got 2"
        );
    }

    #[test]
    fn test_duplicate_node_message() {
        let err = LayoutError::DuplicateNode("a".into());
        assert_eq!(err.to_string(), "duplicate node id: a");
    }
}
