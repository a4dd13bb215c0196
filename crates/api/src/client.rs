use std::env;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use recall_core::model::{
    ActivityItem, AggregateProgress, Card, CardId, HeatmapDay, PerformancePoint, ReviewAck,
    ReviewRating, SkillSlice, TodayPlan, UserStats,
};

use crate::dto::{CardDto, ReviewAckDto, ReviewRequest};
use crate::error::ApiError;
use crate::remote::StudyApi;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct ApiConfig {
    base_url: Url,
    token: Option<String>,
}

impl ApiConfig {
    /// Parse and normalize a base URL, keeping an optional bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidBaseUrl` when the URL does not parse or is
    /// not http(s).
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, ApiError> {
        let mut parsed = Url::parse(base_url.trim())
            .map_err(|_| ApiError::InvalidBaseUrl(base_url.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }
        // Url::join treats a path without a trailing slash as a file.
        if !parsed.path().ends_with('/') {
            parsed.set_path(&format!("{}/", parsed.path()));
        }
        let token = token.filter(|value| !value.trim().is_empty());
        Ok(Self {
            base_url: parsed,
            token,
        })
    }

    /// Read `RECALL_API_URL` / `RECALL_API_TOKEN` from the environment.
    ///
    /// Returns `None` when no URL is configured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base = env::var("RECALL_API_URL").ok()?;
        let token = env::var("RECALL_API_TOKEN").ok();
        Self::new(&base, token).ok()
    }

    #[must_use]
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|_| ApiError::InvalidBaseUrl(path.to_string()))
    }
}

//
// ─── CLIENT ────────────────────────────────────────────────────────────────────
//

/// Reqwest-backed implementation of `StudyApi`.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Malformed(err.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.config.endpoint(path)?;
        let response = self.authorize(self.http.get(url)).send().await?;
        Self::decode(response).await
    }
}

#[async_trait]
impl StudyApi for ApiClient {
    async fn due_cards(&self, limit: usize) -> Result<Vec<Card>, ApiError> {
        let url = self.config.endpoint("flashcards/due")?;
        let response = self
            .authorize(self.http.get(url).query(&[("limit", limit)]))
            .send()
            .await?;
        let dtos: Vec<CardDto> = Self::decode(response).await?;
        dtos.into_iter()
            .map(|dto| {
                dto.into_card()
                    .map_err(|err| ApiError::Malformed(err.to_string()))
            })
            .collect()
    }

    async fn submit_review(
        &self,
        card_id: CardId,
        rating: ReviewRating,
    ) -> Result<ReviewAck, ApiError> {
        let url = self
            .config
            .endpoint(&format!("flashcards/{card_id}/review"))?;
        let body = ReviewRequest {
            quality: rating.quality(),
        };
        let response = self.authorize(self.http.post(url).json(&body)).send().await?;
        let dto: ReviewAckDto = Self::decode(response).await?;
        Ok(dto.into_ack())
    }

    async fn user_stats(&self) -> Result<UserStats, ApiError> {
        self.get_json("users/me/stats").await
    }

    async fn activity_heatmap(&self) -> Result<Vec<HeatmapDay>, ApiError> {
        self.get_json("users/me/heatmap").await
    }

    async fn performance_history(&self) -> Result<Vec<PerformancePoint>, ApiError> {
        self.get_json("users/me/performance").await
    }

    async fn skill_breakdown(&self) -> Result<Vec<SkillSlice>, ApiError> {
        self.get_json("users/me/skills").await
    }

    async fn recent_activities(&self) -> Result<Vec<ActivityItem>, ApiError> {
        self.get_json("activities/recent").await
    }

    async fn aggregate_progress(&self) -> Result<AggregateProgress, ApiError> {
        self.get_json("progress").await
    }

    async fn today_plan(&self) -> Result<TodayPlan, ApiError> {
        self.get_json("plan/today").await
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_garbage_urls() {
        assert!(ApiConfig::new("not a url", None).is_err());
        assert!(ApiConfig::new("ftp://example.com", None).is_err());
    }

    #[test]
    fn config_normalizes_trailing_slash() {
        let config = ApiConfig::new("https://api.example.com/v1", None).unwrap();
        let url = config.endpoint("flashcards/due").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/flashcards/due");
    }

    #[test]
    fn blank_token_counts_as_no_session() {
        let config = ApiConfig::new("https://api.example.com", Some("  ".into())).unwrap();
        assert!(!config.has_token());

        let config = ApiConfig::new("https://api.example.com", Some("tok".into())).unwrap();
        assert!(config.has_token());
    }
}
