//! HTTP client for the dashboard data endpoint.
//!
//! All four resources are plain JSON documents behind GET, so one
//! generic fetch covers them. Non-2xx responses surface as
//! [`Error::Api`] with the status and as much of the body as the server
//! cared to send.

use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::poller::PollKind;
use crate::remote::{ActivityFeed, BotStatus, TokenStats};
use crate::task::TaskSnapshot;

const USER_AGENT: &str = concat!("opsboard/", env!("CARGO_PKG_VERSION"));

#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub async fn fetch_tasks(&self) -> Result<TaskSnapshot> {
        self.get_json(PollKind::Tasks).await
    }

    pub async fn fetch_token_stats(&self) -> Result<TokenStats> {
        self.get_json(PollKind::TokenStats).await
    }

    pub async fn fetch_activity(&self) -> Result<ActivityFeed> {
        self.get_json(PollKind::Activity).await
    }

    pub async fn fetch_bot_status(&self) -> Result<BotStatus> {
        self.get_json(PollKind::BotStatus).await
    }

    async fn get_json<T: DeserializeOwned>(&self, kind: PollKind) -> Result<T> {
        let url = self.config.resource_url(kind);
        debug!(kind = kind.as_str(), %url, "fetching resource");
        let response = self.http.get(&url).send().await?;
        let response = check_response(response).await?;
        Ok(response.json().await?)
    }
}

/// Pass 2xx responses through, turn everything else into [`Error::Api`].
pub async fn check_response(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .ok()
        .map(|body| body.trim().chars().take(200).collect::<String>())
        .filter(|body| !body.is_empty())
        .unwrap_or_else(|| status.to_string());
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
