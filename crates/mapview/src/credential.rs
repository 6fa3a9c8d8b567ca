use tracing::{info, warn};

use crate::config::{ACCESS_TOKEN_VAR, AppConfig};
use crate::error::MapError;

/// A non-blank map access token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Returns `None` for a missing or blank token.
    pub fn new(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Static text shown in place of the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackView {
    pub title: String,
    pub body: String,
}

impl FallbackView {
    pub fn missing_token() -> Self {
        Self {
            title: "Map token missing".to_string(),
            body: format!("Set `{ACCESS_TOKEN_VAR}` in your environment to load the map."),
        }
    }

    pub fn backend_failure(err: &MapError) -> Self {
        Self {
            title: "Map failed to load".to_string(),
            body: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    Proceed(AccessToken),
    Fallback(FallbackView),
}

/// One-shot precondition check run before any map is constructed.
///
/// A missing token is a configuration state, not an error; there is no retry.
pub struct CredentialGate;

impl CredentialGate {
    pub fn check(config: &AppConfig) -> GateDecision {
        match AccessToken::new(config.access_token.as_deref()) {
            Some(token) => {
                info!("map access token present");
                GateDecision::Proceed(token)
            }
            None => {
                warn!(var = ACCESS_TOKEN_VAR, "map access token missing; showing fallback");
                GateDecision::Fallback(FallbackView::missing_token())
            }
        }
    }
}
