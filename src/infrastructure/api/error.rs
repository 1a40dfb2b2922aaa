use thiserror::Error;

/// Status code the wallet API uses for an expired or revoked token
pub const UNAUTHORIZED_CODE: i64 = 401;

/// Error type for wallet API operations
#[derive(Debug, Clone, Error)]
pub enum ApiClientError {
    /// Transport level failure from the HTTP client
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Error object returned by the API
    #[error("API error {code}: {description}")]
    ApiError { code: i64, description: String },

    /// No token is available, or the API rejected it
    #[error("Unauthorized")]
    Unauthorized,

    /// Response could not be decoded
    #[error("Response error: {0}")]
    ResponseError(String),
}

impl ApiClientError {
    pub fn code(&self) -> Option<i64> {
        match self {
            ApiClientError::ApiError { code, .. } => Some(*code),
            ApiClientError::Unauthorized => Some(UNAUTHORIZED_CODE),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.code() == Some(UNAUTHORIZED_CODE)
    }
}

impl From<reqwest::Error> for ApiClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.status().map(|s| s.as_u16()) == Some(UNAUTHORIZED_CODE as u16) {
            return ApiClientError::Unauthorized;
        }
        ApiClientError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for ApiClientError {
    fn from(error: serde_json::Error) -> Self {
        ApiClientError::ResponseError(error.to_string())
    }
}
