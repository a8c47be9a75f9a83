//! Error types shared by providers and the flight query service

use thiserror::Error;

/// Errors that can occur while answering a flight query
///
/// Cache problems never show up here: an unreadable or stale cache entry is a
/// miss, and a failed cache write is logged and ignored.
#[derive(Debug, Error)]
pub enum FlightError {
    /// The selected provider needs an API key and none was configured
    #[error("AVIATIONSTACK_API_KEY is not set")]
    MissingApiKey,

    /// The upstream API could not be reached
    #[error("failed to reach {provider} API: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream API answered with a non-success HTTP status
    #[error("{provider} API returned status {status}")]
    HttpStatus { provider: &'static str, status: u16 },

    /// The upstream API answered successfully but reported an error in the body
    #[error("{provider} API error: {message}")]
    Api {
        provider: &'static str,
        message: String,
    },

    /// The upstream response body could not be parsed
    #[error("failed to parse {provider} response: {source}")]
    Parse {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The upstream returned no matching records
    #[error("{0}")]
    NotFound(String),

    /// The provider does not offer this kind of query
    #[error("{operation} is not supported by the {provider} provider")]
    Unsupported {
        provider: &'static str,
        operation: &'static str,
    },

    /// An offline fixture file could not be loaded
    #[error("failed to load fixture file: {0}")]
    Fixture(String),
}

impl FlightError {
    /// Returns true for errors that mean "the query succeeded but found nothing"
    pub fn is_not_found(&self) -> bool {
        matches!(self, FlightError::NotFound(_))
    }

    /// Returns true when the provider lacks the capability entirely
    pub fn is_unsupported(&self) -> bool {
        matches!(self, FlightError::Unsupported { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message_names_provider_and_operation() {
        let err = FlightError::Unsupported {
            provider: "OpenSky",
            operation: "airport board lookup",
        };
        assert_eq!(
            err.to_string(),
            "airport board lookup is not supported by the OpenSky provider"
        );
        assert!(err.is_unsupported());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_is_distinct_from_transport_errors() {
        let err = FlightError::NotFound("no flight found for KE38".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "no flight found for KE38");

        let status = FlightError::HttpStatus {
            provider: "AviationStack",
            status: 503,
        };
        assert!(!status.is_not_found());
        assert!(status.to_string().contains("503"));
    }
}
