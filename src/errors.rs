//! Error types for the casino-desk back-office
//!
//! Root error with per-layer variants. Leaf errors of the HTTP and export
//! layers live next to their code and convert into `DeskError`.

use std::fmt;

use crate::api::errors::ApiError;
use crate::export::ExportError;

/// Root error type for all casino-desk operations
#[derive(Debug)]
pub enum DeskError {
    /// Configuration loading and validation errors
    Configuration(ConfigurationError),

    /// Backend request errors
    Api(ApiError),

    /// Report export errors
    Export(ExportError),

    /// Local filesystem errors
    Io(std::io::Error),
}

/// Configuration and validation errors
#[derive(Debug, Clone)]
pub enum ConfigurationError {
    MissingRequired(String),
    InvalidValue { field: String, value: String, reason: String },
    LoadFailed(String),
    SaveFailed(String),
}

impl fmt::Display for DeskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeskError::Configuration(e) => write!(f, "Configuration error: {}", e),
            DeskError::Api(e) => write!(f, "API error: {}", e),
            DeskError::Export(e) => write!(f, "Export error: {}", e),
            DeskError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::MissingRequired(field) => write!(f, "Missing required field: {}", field),
            ConfigurationError::InvalidValue { field, value, reason } => {
                write!(f, "Invalid value for {}: '{}' ({})", field, value, reason)
            }
            ConfigurationError::LoadFailed(msg) => write!(f, "Failed to load configuration: {}", msg),
            ConfigurationError::SaveFailed(msg) => write!(f, "Failed to save configuration: {}", msg),
        }
    }
}

impl std::error::Error for DeskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeskError::Configuration(e) => Some(e),
            DeskError::Api(e) => Some(e),
            DeskError::Export(e) => Some(e),
            DeskError::Io(e) => Some(e),
        }
    }
}

impl std::error::Error for ConfigurationError {}

impl From<ConfigurationError> for DeskError {
    fn from(e: ConfigurationError) -> Self {
        DeskError::Configuration(e)
    }
}

impl From<ApiError> for DeskError {
    fn from(e: ApiError) -> Self {
        DeskError::Api(e)
    }
}

impl From<ExportError> for DeskError {
    fn from(e: ExportError) -> Self {
        DeskError::Export(e)
    }
}

impl From<std::io::Error> for DeskError {
    fn from(e: std::io::Error) -> Self {
        DeskError::Io(e)
    }
}

impl From<serde_json::Error> for DeskError {
    fn from(e: serde_json::Error) -> Self {
        DeskError::Api(ApiError::Decode(e.to_string()))
    }
}

/// Convenience type alias for Results
pub type DeskResult<T> = Result<T, DeskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let config_error = ConfigurationError::MissingRequired("api.origin".to_string());
        let desk_error = DeskError::Configuration(config_error);

        assert!(desk_error.to_string().contains("Configuration error"));
        assert!(desk_error.to_string().contains("api.origin"));
    }

    #[test]
    fn test_invalid_value_details() {
        let error = ConfigurationError::InvalidValue {
            field: "export.image_concurrency".to_string(),
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        };

        assert!(error.to_string().contains("export.image_concurrency"));
        assert!(error.to_string().contains("'0'"));
    }

    #[test]
    fn test_error_conversion() {
        let desk_error: DeskError = ApiError::Unauthorized.into();

        match desk_error {
            DeskError::Api(ApiError::Unauthorized) => {}
            _ => panic!("Expected API error"),
        }
    }

    #[test]
    fn test_error_source() {
        let desk_error = DeskError::Configuration(ConfigurationError::LoadFailed("bad toml".to_string()));
        assert!(desk_error.source().is_some());
    }
}
