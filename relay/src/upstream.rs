use crate::config::{UpstreamConfig, ValidationError};
use crate::errors::RelayError;
use http::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderValue};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use url::Url;

const USER_AGENT: &str = concat!("DiscordBot (profile-relay, ", env!("CARGO_PKG_VERSION"), ")");

/// Secret used to authenticate against the Discord API as a bot.
#[derive(Clone)]
pub struct BotToken(String);

impl BotToken {
    pub fn new(token: impl Into<String>) -> Self {
        BotToken(token.into())
    }

    /// Reads the token from `var`. Unset and blank values both yield `None`.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .map(BotToken)
    }

    fn header_value(&self) -> Result<HeaderValue, RelayError> {
        let mut value = HeaderValue::from_str(&format!("Bot {}", self.0))
            .map_err(|_| RelayError::InvalidToken)?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BotToken(<redacted>)")
    }
}

/// Base URLs of the API and CDN.
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub api_url: Url,
    pub cdn_url: Url,
}

impl TryFrom<&UpstreamConfig> for Endpoints {
    type Error = ValidationError;

    fn try_from(config: &UpstreamConfig) -> Result<Self, Self::Error> {
        Ok(Endpoints {
            api_url: parse_base_url("api_url", &config.api_url)?,
            cdn_url: parse_base_url("cdn_url", &config.cdn_url)?,
        })
    }
}

impl Endpoints {
    pub fn user_url(&self, id: &str) -> Url {
        append_segments(&self.api_url, &["users", id])
    }

    pub fn avatar_url(&self, id: &str, avatar: &str) -> String {
        append_segments(&self.cdn_url, &["avatars", id, &format!("{avatar}.png")]).into()
    }

    pub fn banner_url(&self, id: &str, banner: &str) -> String {
        append_segments(&self.cdn_url, &["banners", id, &format!("{banner}.png")]).into()
    }
}

fn parse_base_url(field: &'static str, raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::InvalidUrl {
        field,
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ValidationError::InvalidUrl {
            field,
            reason: format!("unsupported scheme {other}"),
        }),
    }
}

// Each segment is percent-encoded, so an identifier can never escape its path segment
fn append_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Status and decoded body of an upstream response.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub payload: Map<String, Value>,
}

/// Shared client for the Discord users API.
///
/// Cloning is cheap, the underlying connection pool is shared.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    endpoints: Endpoints,
    authorization: Option<HeaderValue>,
    timeout: Duration,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig, token: Option<BotToken>) -> Result<Self, RelayError> {
        let endpoints = Endpoints::try_from(config)?;
        let authorization = token.map(|t| t.header_value()).transpose()?;
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;

        Ok(UpstreamClient {
            client,
            endpoints,
            authorization,
            timeout: config.timeout(),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetches a user and decodes the body into a JSON object.
    ///
    /// The timeout covers connecting, sending and collecting the complete body.
    pub async fn fetch_user(&self, id: &str) -> Result<UpstreamResponse, RelayError> {
        let url = self.endpoints.user_url(id);
        let upstream = url.host_str().unwrap_or("upstream").to_string();

        let mut request = self.client.get(url);
        if let Some(authorization) = &self.authorization {
            request = request.header(AUTHORIZATION, authorization.clone());
        }

        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| RelayError::UpstreamRequestFailed(upstream.clone(), e.to_string()))?;
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| RelayError::ResponseBodyError(e.to_string()))?;
            Ok::<_, RelayError>((status, body))
        };

        let (status, body) = timeout(self.timeout, exchange)
            .await
            .map_err(|_| RelayError::UpstreamTimeout(upstream.clone()))??;

        tracing::debug!(%status, bytes = body.len(), "Received upstream response");

        let payload = serde_json::from_slice::<Map<String, Value>>(&body)
            .map_err(|e| RelayError::DecodeError(e.to_string()))?;

        Ok(UpstreamResponse { status, payload })
    }
}
