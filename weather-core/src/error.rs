use thiserror::Error;

/// Fallback alert text when the API rejects a lookup without a message.
pub const DEFAULT_NOT_FOUND_MESSAGE: &str = "City Not Found";

/// Outcomes of a search that did not produce a weather result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// No API key in the config file or environment.
    #[error(
        "API key is missing! Set OPENWEATHER_API_KEY or run `wxlookup configure` to store one."
    )]
    MissingApiKey,

    /// Empty or purely numeric search text.
    #[error("Please enter a valid city")]
    InvalidQuery,

    /// The API answered, but its embedded status code was not 200.
    #[error("{message}")]
    Api { code: Option<u16>, message: String },

    /// Transport, body read or decode failure. Nothing useful reached us.
    #[error("weather service unavailable: {0}")]
    Unavailable(String),
}

impl LookupError {
    /// Text shown to the user in an alert.
    pub fn alert_text(&self) -> String {
        self.to_string()
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, LookupError::Unavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_alert_is_message_verbatim() {
        let err = LookupError::Api { code: Some(404), message: "city not found".into() };
        assert_eq!(err.alert_text(), "city not found");
    }

    #[test]
    fn invalid_query_alert_text() {
        assert_eq!(LookupError::InvalidQuery.alert_text(), "Please enter a valid city");
    }

    #[test]
    fn only_transport_failures_are_unavailable() {
        assert!(LookupError::Unavailable("connection refused".into()).is_unavailable());
        assert!(!LookupError::MissingApiKey.is_unavailable());
    }
}
