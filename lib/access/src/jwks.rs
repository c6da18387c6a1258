//! Published key set retrieval and caching.
//!
//! Keys are fetched lazily and reused until the cache TTL runs out. A token
//! signed with an unknown key id triggers one refetch, at most once per
//! cooldown window, so a rotated key is picked up without letting forged
//! key ids flood the issuer with requests.

use crate::config::AuthConfig;
use crate::error::{AuthError, KeySetError};
use async_trait::async_trait;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::jwk::JwkSet;
use rootcause::Report;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// A source of signing keys.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetches the current key set.
    async fn fetch(&self) -> Result<JwkSet, Report<KeySetError>>;
}

/// Fetches the key set over HTTP.
pub struct HttpKeySource {
    client: reqwest::Client,
    url: String,
}

impl HttpKeySource {
    /// Creates a source for `url` with the given request timeout.
    pub fn new(url: String, timeout: Duration) -> Result<Self, Report<KeySetError>> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KeySetError::Client {
                reason: e.to_string(),
            })?;

        Ok(Self { client, url })
    }

    /// Creates a source for the issuer described by `config`.
    pub fn from_config(config: &AuthConfig) -> Result<Self, Report<KeySetError>> {
        Self::new(config.jwks_url(), config.jwks_timeout())
    }

    /// Returns the key set URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<JwkSet, Report<KeySetError>> {
        let response =
            self.client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| KeySetError::Request {
                    url: self.url.clone(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeySetError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            }
            .into());
        }

        let keys = response
            .json::<JwkSet>()
            .await
            .map_err(|e| KeySetError::Parse {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;

        debug!(keys = keys.keys.len(), "fetched key set");
        Ok(keys)
    }
}

/// A fixed key set, for tests and offline use.
pub struct StaticKeySource {
    keys: JwkSet,
}

impl StaticKeySource {
    #[must_use]
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch(&self) -> Result<JwkSet, Report<KeySetError>> {
        Ok(self.keys.clone())
    }
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheState {
    keys: Option<CachedKeys>,
    last_attempt: Option<Instant>,
}

impl CacheState {
    /// Looks `kid` up in the held keys regardless of their age.
    fn stale_key(&self, kid: &str) -> Option<Result<DecodingKey, AuthError>> {
        self.keys.as_ref().and_then(|entry| lookup(&entry.keys, kid))
    }
}

/// Caches the key set from a [`KeySource`].
///
/// Every fetch attempt, successful or not, starts a cooldown window in which
/// no further fetch is made; requests in that window are served from the
/// keys already held, however old.
pub struct JwksCache {
    source: Arc<dyn KeySource>,
    ttl: Duration,
    refetch_cooldown: Duration,
    state: RwLock<CacheState>,
}

impl JwksCache {
    /// Creates an empty cache over `source`.
    pub fn new(source: Arc<dyn KeySource>, ttl: Duration, refetch_cooldown: Duration) -> Self {
        Self {
            source,
            ttl,
            refetch_cooldown,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Creates a cache using the TTL and cooldown from `config`.
    pub fn from_config(source: Arc<dyn KeySource>, config: &AuthConfig) -> Self {
        Self::new(source, config.jwks_ttl(), config.jwks_refetch_cooldown())
    }

    /// Returns the decoding key for `kid`, fetching keys as the refresh
    /// policy allows.
    pub async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AuthError> {
        {
            let state = self.state.read().await;
            if let Some(entry) = &state.keys {
                if entry.fetched_at.elapsed() < self.ttl {
                    if let Some(key) = lookup(&entry.keys, kid) {
                        return key;
                    }
                }
            }

            let cooling_down = state
                .last_attempt
                .is_some_and(|at| at.elapsed() < self.refetch_cooldown);
            if cooling_down {
                debug!(kid, "key set refetch within cooldown");
                return match state.stale_key(kid) {
                    Some(key) => key,
                    None if state.keys.is_some() => Err(AuthError::UnknownKeyId {
                        kid: kid.to_string(),
                    }),
                    None => Err(AuthError::KeySetUnavailable {
                        reason: "key set fetch failed recently".to_string(),
                    }),
                };
            }
        }

        let attempt = Instant::now();
        let fetched = self.source.fetch().await;
        let mut state = self.state.write().await;
        state.last_attempt = Some(attempt);

        match fetched {
            Ok(keys) => {
                let result = lookup(&keys, kid);
                state.keys = Some(CachedKeys {
                    keys,
                    fetched_at: attempt,
                });
                result.unwrap_or_else(|| {
                    Err(AuthError::UnknownKeyId {
                        kid: kid.to_string(),
                    })
                })
            }
            Err(report) => {
                warn!(error = %report, "failed to fetch key set");
                match state.stale_key(kid) {
                    Some(key) => key,
                    None => Err(AuthError::KeySetUnavailable {
                        reason: report.to_string(),
                    }),
                }
            }
        }
    }
}

fn lookup(keys: &JwkSet, kid: &str) -> Option<Result<DecodingKey, AuthError>> {
    keys.find(kid).map(|jwk| {
        DecodingKey::from_jwk(jwk).map_err(|e| AuthError::KeySetUnavailable {
            reason: format!("key '{kid}' is unusable: {e}"),
        })
    })
}
