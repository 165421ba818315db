use thiserror::Error;

#[derive(Error, Debug)]
pub enum CartError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

impl CartError {
    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            CartError::ApiError(_) => "Could not reach the catalog service".to_string(),
            CartError::IoError(_) | CartError::StorageError { .. } => {
                "Could not access the cart storage".to_string()
            }
            CartError::SerializationError(_) => "Cart data is malformed".to_string(),
            CartError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration value for {}: {}", field, reason)
            }
            CartError::ConfigError { message }
            | CartError::ConfigValidationError { message, .. } => {
                format!("Configuration problem: {}", message)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CartError::ApiError(_) => "Check that the catalog endpoint is reachable",
            CartError::IoError(_) | CartError::StorageError { .. } => {
                "Check that the storage path exists and is writable"
            }
            CartError::SerializationError(_) => "Remove the stored cart to start over",
            _ => "Review the command line flags or the TOML configuration file",
        }
    }
}

pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_and_suggestions() {
        let err = CartError::InvalidConfigValueError {
            field: "catalog.endpoint".to_string(),
            value: "localhost".to_string(),
            reason: "Invalid URL format".to_string(),
        };
        assert!(err.user_friendly_message().contains("catalog.endpoint"));
        assert_eq!(
            err.recovery_suggestion(),
            "Review the command line flags or the TOML configuration file"
        );

        let err = CartError::StorageError {
            message: "disk full".to_string(),
        };
        assert_eq!(
            err.recovery_suggestion(),
            "Check that the storage path exists and is writable"
        );
    }
}
