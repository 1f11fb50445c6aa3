use serde_json::{Value, json};
use thiserror::Error;

/// Failures on the upstream data path. Every variant maps to a structured
/// JSON payload; none is fatal to the caller's process.
#[derive(Debug, Error)]
pub enum Error {
    /// The upstream HTTP request completed with a non-success status.
    #[error("upstream request failed with status {status}")]
    UpstreamStatus { status: u16 },

    /// The provider answered 200 but reported a non-OK status in the body.
    #[error("API returned non-OK status: {raw_status}")]
    ProviderStatus { raw_status: String },

    /// A field the consumer cannot do without is absent from the payload.
    #[error("{0}")]
    MissingData(String),

    /// Network-level failure reaching the upstream, including timeouts.
    #[error("failed to reach upstream: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream body was not the JSON we expected.
    #[error("failed to decode upstream payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl Error {
    /// The `{error, ...}` JSON body served to API consumers.
    pub fn payload(&self) -> Value {
        match self {
            Error::UpstreamStatus { status } => {
                json!({ "error": self.to_string(), "status": status })
            }
            Error::ProviderStatus { raw_status } => {
                json!({ "error": "API returned non-OK status", "raw_status": raw_status })
            }
            _ => json!({ "error": self.to_string() }),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_payload_carries_status_code() {
        let payload = Error::UpstreamStatus { status: 503 }.payload();
        assert_eq!(payload["status"], 503);
        assert!(payload["error"].as_str().unwrap().contains("503"));
    }

    #[test]
    fn provider_status_payload_carries_raw_status() {
        let err = Error::ProviderStatus { raw_status: "nug".to_string() };
        let payload = err.payload();
        assert_eq!(payload["error"], "API returned non-OK status");
        assert_eq!(payload["raw_status"], "nug");
    }

    #[test]
    fn missing_data_payload_is_just_the_message() {
        let payload = Error::MissingData("No AQI data available".to_string()).payload();
        assert_eq!(payload, json!({ "error": "No AQI data available" }));
    }
}
