use rangaayan_agent::LoopError;
use rangaayan_core::error::ProviderError;
use rangaayan_tools::SearchError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The caller sent something unusable (blank product name, empty image).
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Loop(#[from] LoopError),

    #[error("Model returned an empty analysis")]
    EmptyAnalysis,

    #[error("Provider setup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Search setup failed: {0}")]
    Search(#[from] SearchError),
}

impl ServiceError {
    /// Whether the caller, rather than an upstream, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Trimmed product name, or `InvalidInput` when blank.
pub(crate) fn require_product(product_name: &str) -> Result<&str, ServiceError> {
    let trimmed = product_name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput("Product name is required".into()));
    }
    Ok(trimmed)
}

/// Optional free-text field, with blanks treated as absent.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_product_is_rejected() {
        for name in ["", "   ", "\n\t"] {
            let err = require_product(name).unwrap_err();
            assert!(err.is_client_error());
            assert_eq!(err.to_string(), "Product name is required");
        }
        assert_eq!(require_product("  clay pot ").unwrap(), "clay pot");
    }

    #[test]
    fn non_blank_filters_whitespace() {
        assert_eq!(non_blank(&None), None);
        assert_eq!(non_blank(&Some("  ".into())), None);
        assert_eq!(non_blank(&Some(" Jaipur ".into())), Some("Jaipur"));
    }

    #[test]
    fn upstream_errors_are_not_client_errors() {
        assert!(!ServiceError::EmptyAnalysis.is_client_error());
        assert!(!ServiceError::Loop(LoopError::EmptyContent).is_client_error());
    }
}
