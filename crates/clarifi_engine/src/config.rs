use std::time::Duration;

/// Where and how to reach the two remote endpoints. Read-only for the life of
/// the process and shared by every session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub analysis_url: String,
    pub question_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl EndpointConfig {
    pub fn new(analysis_url: impl Into<String>, question_url: impl Into<String>) -> Self {
        Self {
            analysis_url: analysis_url.into(),
            question_url: question_url.into(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}
