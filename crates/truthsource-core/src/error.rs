use thiserror::Error;

/// Validation and configuration errors exposed by `truthsource-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid category '{value}', expected one of crypto, sports, weather, economics, finance, forex, onchain, social, prediction, news, custom")]
    InvalidCategory { value: String },

    #[error("base url cannot be empty")]
    EmptyBaseUrl,
    #[error("base url must start with http:// or https://: '{value}'")]
    BaseUrlScheme { value: String },

    #[error("endpoint name cannot be empty")]
    EmptyEndpointName,
    #[error("endpoint '{endpoint}' has an empty segment in data path '{data_path}'")]
    EmptyDataPathSegment { endpoint: String, data_path: String },

    #[error("unsupported http method '{value}', expected GET or POST")]
    InvalidHttpMethod { value: String },

    #[error("invalid proxy url '{value}': {reason}")]
    InvalidProxy { value: String, reason: String },
    #[error("transport timeout must be greater than zero")]
    ZeroTimeout,
    #[error("invalid transport header '{name}'")]
    InvalidHeader { name: String },
    #[error("failed to build transport client: {reason}")]
    TransportBuild { reason: String },
}

/// Top-level error type for configuration loading.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
