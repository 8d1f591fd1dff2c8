use std::fmt;

/// Failures surfaced by the exchange client
#[derive(Debug)]
pub enum DeltaError {
    Request(String),
    NonJsonResponse(String),
    Parse(String),
    MissingData(String),
}

impl fmt::Display for DeltaError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeltaError::Request(msg) => write!(f, "Request error: {}", msg),
            DeltaError::NonJsonResponse(preview) => write!(f, "Non-JSON response: {}", preview),
            DeltaError::Parse(msg) => write!(f, "Parse error: {}", msg),
            DeltaError::MissingData(msg) => write!(f, "Missing data: {}", msg),
        }
    }
}

impl std::error::Error for DeltaError {}

impl From<reqwest::Error> for DeltaError {
    fn from(err: reqwest::Error) -> Self {
        DeltaError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for DeltaError {
    fn from(err: serde_json::Error) -> Self {
        DeltaError::Parse(err.to_string())
    }
}
