//! Error types for footprint calculation and rendering

use thiserror::Error;

/// Result type for calculation and rendering
pub type ImpactResult<T> = Result<T, ImpactError>;

/// Errors surfaced by a single calculation request
#[derive(Error, Debug)]
pub enum ImpactError {
    /// A form field was missing, empty, or not a finite number
    #[error("Invalid value for '{field}'")]
    InvalidInput { field: &'static str },

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ImpactError {
    /// True for errors caused by the caller's input rather than by the renderer
    pub fn is_client_error(&self) -> bool {
        matches!(self, ImpactError::InvalidInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_invalid_input_is_client_error() {
        assert!(ImpactError::InvalidInput { field: "mass" }.is_client_error());
        assert!(!ImpactError::Render("canvas".into()).is_client_error());
        assert!(!ImpactError::Internal("join".into()).is_client_error());
    }

    #[test]
    fn invalid_input_names_field() {
        let err = ImpactError::InvalidInput { field: "entry_angle" };
        assert_eq!(err.to_string(), "Invalid value for 'entry_angle'");
    }
}
