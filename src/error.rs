//! Error types for content graph resolution.
//!
//! Only configuration defects surface as errors. Data-shape mismatches
//! (missing elements, absent linked items, unresolved markers) are recovered
//! where they occur and never reach this type.

use thiserror::Error;

/// Errors raised while configuring or running the delivery engine.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// A bound element cannot be assigned to the declared field type.
    #[error(
        "Cannot assign element '{codename}' ({found}) to field '{shape}::{field}' (expects {expected})"
    )]
    FieldType {
        /// Target shape type name.
        shape: &'static str,
        /// Field name on the shape.
        field: &'static str,
        /// Element codename that matched the field.
        codename: String,
        /// Element kind the field accepts.
        expected: &'static str,
        /// Element kind actually found.
        found: &'static str,
    },

    /// A shape was registered without a content type and declares none itself.
    #[error("Shape '{shape}' declares no content type; register it with an explicit tag")]
    MissingContentType {
        /// Shape type name.
        shape: &'static str,
    },

    /// Template registration or rendering failed.
    #[error("Template error for content type '{content_type}': {message}")]
    Template {
        /// Content type the template is keyed by.
        content_type: String,
        /// Underlying template engine message.
        message: String,
    },

    /// Resolver configuration could not be loaded.
    #[error("Invalid resolver configuration: {0}")]
    Config(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DeliveryError {
    /// Get an error code for this error type.
    pub fn code(&self) -> &'static str {
        match self {
            Self::FieldType { .. } => "FIELD_TYPE",
            Self::MissingContentType { .. } => "MISSING_CONTENT_TYPE",
            Self::Template { .. } => "TEMPLATE",
            Self::Config(_) => "CONFIG",
            Self::Json(_) => "JSON",
        }
    }

    /// True when the error points at a defect in caller-registered shapes or
    /// templates rather than at the content being resolved.
    pub fn is_configuration_defect(&self) -> bool {
        matches!(
            self,
            Self::FieldType { .. } | Self::MissingContentType { .. } | Self::Template { .. }
        )
    }
}

impl From<serde_yaml::Error> for DeliveryError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<std::io::Error> for DeliveryError {
    fn from(e: std::io::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        let err = DeliveryError::MissingContentType { shape: "Article" };
        assert_eq!(err.code(), "MISSING_CONTENT_TYPE");
        assert!(err.is_configuration_defect());

        let err = DeliveryError::Config("bad yaml".into());
        assert_eq!(err.code(), "CONFIG");
        assert!(!err.is_configuration_defect());
    }

    #[test]
    fn test_field_type_message() {
        let err = DeliveryError::FieldType {
            shape: "Article",
            field: "title",
            codename: "title".into(),
            expected: "text",
            found: "number",
        };
        assert_eq!(
            err.to_string(),
            "Cannot assign element 'title' (number) to field 'Article::title' (expects text)"
        );
    }
}
