//! Typed access to the scenario generation, analysis and save endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{PersonalityMode, Scenario},
    protocol::{
        AnalyzeRequest, AnalyzeResponse, GenerateRequest, GenerateResponse, SaveResponseRequest,
    },
};
use tracing::debug;

use crate::error::QuizApiError;

#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn generate_scenario(&self, theme: &str) -> Result<Scenario, QuizApiError>;

    /// `Ok(None)` means the service answered without an analysis.
    async fn analyze_personality(
        &self,
        theme: &str,
        choices: &[String],
        avoided: &[String],
        mode: PersonalityMode,
    ) -> Result<Option<String>, QuizApiError>;

    async fn save_response(
        &self,
        theme: &str,
        analysis: &str,
        mode: PersonalityMode,
    ) -> Result<(), QuizApiError>;
}

pub struct HttpQuizApi {
    http: Client,
    base_url: String,
}

impl HttpQuizApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, QuizApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, QuizApiError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, "posting quiz request");
        let res = self
            .http
            .post(url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json().await?)
    }
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn generate_scenario(&self, theme: &str) -> Result<Scenario, QuizApiError> {
        let body: GenerateResponse = self
            .post_json(
                "/generate",
                &GenerateRequest {
                    themes: theme.to_string(),
                },
            )
            .await?;
        if let Some(message) = body.error {
            return Err(QuizApiError::Service(message));
        }
        body.scenario().ok_or_else(|| {
            QuizApiError::InvalidResponse("scenario is missing a situation or a choice".to_string())
        })
    }

    async fn analyze_personality(
        &self,
        theme: &str,
        choices: &[String],
        avoided: &[String],
        mode: PersonalityMode,
    ) -> Result<Option<String>, QuizApiError> {
        let body: AnalyzeResponse = self
            .post_json(
                "/analyze",
                &AnalyzeRequest {
                    themes: theme.to_string(),
                    choices: choices.to_vec(),
                    avoided: avoided.to_vec(),
                    personality_mode: mode,
                },
            )
            .await?;
        if let Some(message) = body.error {
            return Err(QuizApiError::Service(message));
        }
        Ok(body.analysis.filter(|text| !text.trim().is_empty()))
    }

    async fn save_response(
        &self,
        theme: &str,
        analysis: &str,
        mode: PersonalityMode,
    ) -> Result<(), QuizApiError> {
        let url = format!("{}/save_response", self.base_url);
        self.http
            .post(url)
            .json(&SaveResponseRequest {
                theme: theme.to_string(),
                analysis: analysis.to_string(),
                personality_mode: mode,
            })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Stand-in used until a backend is configured; every call fails with a
/// transport error.
pub struct MissingQuizApi;

#[async_trait]
impl QuizApi for MissingQuizApi {
    async fn generate_scenario(&self, _theme: &str) -> Result<Scenario, QuizApiError> {
        Err(QuizApiError::Transport("quiz service is unavailable".to_string()))
    }

    async fn analyze_personality(
        &self,
        _theme: &str,
        _choices: &[String],
        _avoided: &[String],
        _mode: PersonalityMode,
    ) -> Result<Option<String>, QuizApiError> {
        Err(QuizApiError::Transport("quiz service is unavailable".to_string()))
    }

    async fn save_response(
        &self,
        _theme: &str,
        _analysis: &str,
        _mode: PersonalityMode,
    ) -> Result<(), QuizApiError> {
        Err(QuizApiError::Transport("quiz service is unavailable".to_string()))
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
