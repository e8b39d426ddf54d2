use engine_logging::{engine_debug, engine_info, engine_warn};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::{ClientError, EndpointConfig, FailureKind};

/// Sends a document to the analysis endpoint. The response body is returned
/// untouched; interpreting it is the classifier's job.
#[async_trait::async_trait]
pub trait AnalysisClient: Send + Sync {
    async fn submit(&self, text: &str) -> Result<String, ClientError>;
}

/// Sends a follow-up question, with the document and its report as context,
/// to the question endpoint. The body is the answer, verbatim.
#[async_trait::async_trait]
pub trait QaClient: Send + Sync {
    async fn ask(
        &self,
        question: &str,
        original_text: &str,
        report: &str,
    ) -> Result<String, ClientError>;
}

#[derive(Serialize)]
struct AnalysisRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRequest<'a> {
    question: &'a str,
    original_text: &'a str,
    analysis_report: &'a str,
}

#[derive(Debug, Clone)]
pub struct ReqwestServiceClient {
    config: EndpointConfig,
    client: reqwest::Client,
}

impl ReqwestServiceClient {
    pub fn new(config: EndpointConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ClientError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { config, client })
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<String, ClientError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|err| ClientError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let payload = serde_json::to_vec(body)
            .map_err(|err| ClientError::new(FailureKind::InvalidRequest, err.to_string()))?;
        engine_debug!("POST {} with {} byte body", parsed, payload.len());

        let response = self
            .client
            .post(parsed)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            engine_warn!("POST {} returned {}", url, status);
            return Err(ClientError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let text = response.text().await.map_err(map_reqwest_error)?;
        engine_info!("POST {} returned {} ({} bytes)", url, status, text.len());
        Ok(text)
    }
}

#[async_trait::async_trait]
impl AnalysisClient for ReqwestServiceClient {
    async fn submit(&self, text: &str) -> Result<String, ClientError> {
        self.post_json(&self.config.analysis_url, &AnalysisRequest { text })
            .await
    }
}

#[async_trait::async_trait]
impl QaClient for ReqwestServiceClient {
    async fn ask(
        &self,
        question: &str,
        original_text: &str,
        report: &str,
    ) -> Result<String, ClientError> {
        let request = QuestionRequest {
            question,
            original_text,
            analysis_report: report,
        };
        self.post_json(&self.config.question_url, &request).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        return ClientError::new(FailureKind::Timeout, err.to_string());
    }
    ClientError::new(FailureKind::Network, err.to_string())
}
