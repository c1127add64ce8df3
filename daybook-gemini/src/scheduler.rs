use daybook_core::{DaybookError, DaybookResult, ProposedEvent, ScheduleRequest, Scheduler};
use tracing::{debug, info};

use crate::api::{GenerateRequest, GenerateResponse, parse_proposals};
use crate::prompt::build_prompt;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-exp";

/// Scheduler backed by the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiScheduler {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiScheduler {
    pub fn new(api_key: impl Into<String>) -> Self {
        GeminiScheduler {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate(&self, prompt: String) -> DaybookResult<String> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await
            .map_err(|e| DaybookError::Scheduler(format!("Failed to reach Gemini: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(DaybookError::Scheduler(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| DaybookError::Scheduler(format!("Failed to parse Gemini response: {e}")))?;

        body.text()
            .map(String::from)
            .ok_or_else(|| DaybookError::Scheduler("Gemini returned no candidates".into()))
    }
}

impl Scheduler for GeminiScheduler {
    async fn schedule(&self, request: &ScheduleRequest) -> DaybookResult<Vec<ProposedEvent>> {
        let prompt = build_prompt(request);
        debug!(model = %self.model, chars = prompt.len(), "sending planning prompt");

        let text = self.generate(prompt).await?;
        let proposals = parse_proposals(&text)?;

        info!(count = proposals.len(), "gemini proposed events");
        Ok(proposals)
    }
}
