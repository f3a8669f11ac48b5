use crate::config::{Config, UpstreamErrorMode};
use crate::errors::RelayError;
use crate::profile::{self, Projection};
use crate::upstream::{BotToken, UpstreamClient};
use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

/// Looks up Discord users and answers with the reduced profile contract.
#[derive(Clone)]
pub struct ProfileHandler {
    upstream: UpstreamClient,
    error_mode: UpstreamErrorMode,
}

impl ProfileHandler {
    pub fn new(config: &Config, token: Option<BotToken>) -> Result<Self, RelayError> {
        Ok(ProfileHandler {
            upstream: UpstreamClient::new(&config.upstream, token)?,
            error_mode: config.upstream_errors,
        })
    }

    pub async fn lookup(&self, id: &str) -> Result<Response, RelayError> {
        let upstream = self.upstream.fetch_user(id).await?;

        match profile::project(id, upstream.payload, self.upstream.endpoints())? {
            Projection::UpstreamError(message) => {
                tracing::info!(id, status = %upstream.status, "Upstream reported an error");
                let status = match self.error_mode {
                    UpstreamErrorMode::Passthrough => StatusCode::OK,
                    UpstreamErrorMode::MirrorStatus => upstream.status,
                };
                Ok((status, Json(message)).into_response())
            }
            Projection::Profile(profile) => Ok(Json(profile).into_response()),
        }
    }
}
