//! Projection of Discord user payloads onto the relay's profile contract.

use crate::errors::RelayError;
use crate::upstream::Endpoints;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reduced representation of a Discord user returned to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub username: String,
    pub global_name: String,
    pub assets: Assets,
}

/// Image URLs derived from asset hashes. Missing assets are empty strings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Assets {
    pub avatar_url: String,
    pub banner_url: String,
}

// `null` and absent asset hashes both decode to `None`
#[derive(Debug, Deserialize)]
struct UpstreamUser {
    id: String,
    username: String,
    global_name: String,
    avatar: Option<String>,
    banner: Option<String>,
}

/// Outcome of projecting an upstream payload.
#[derive(Debug, PartialEq)]
pub enum Projection {
    /// The upstream signalled an error, carries the `message` value untouched.
    UpstreamError(Value),
    Profile(Profile),
}

/// Projects a decoded upstream payload for the user `id`.
///
/// Asset URLs are built from `id` as requested, not the id echoed back.
pub fn project(
    id: &str,
    mut payload: Map<String, Value>,
    endpoints: &Endpoints,
) -> Result<Projection, RelayError> {
    if let Some(message) = payload.remove("message") {
        return Ok(Projection::UpstreamError(message));
    }

    let user: UpstreamUser = serde_json::from_value(Value::Object(payload))
        .map_err(|e| RelayError::InvalidPayload(e.to_string()))?;

    let assets = Assets {
        avatar_url: user
            .avatar
            .map(|avatar| endpoints.avatar_url(id, &avatar))
            .unwrap_or_default(),
        banner_url: user
            .banner
            .map(|banner| endpoints.banner_url(id, &banner))
            .unwrap_or_default(),
    };

    Ok(Projection::Profile(Profile {
        id: user.id,
        username: user.username,
        global_name: user.global_name,
        assets,
    }))
}
