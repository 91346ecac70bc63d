//! Per-browser session state, held in memory with moka.
//!
//! Each browser session owns an independent copy of the rate catalog, the
//! batch ledger and the last built quote - there is no cross-session
//! sharing. Sessions are keyed by a `sid` cookie and evicted after a period
//! of inactivity; an evicted or unknown session id simply starts fresh.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, Response};
use moka::future::Cache;
use serde::Serialize;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::pricing::{BatchLedger, Quote, RateCatalog};

pub const SESSION_COOKIE: &str = "sid";

/// Everything one user session accumulates between requests.
#[derive(Debug)]
pub struct SessionState {
    pub catalog: RateCatalog,
    pub batch: BatchLedger,
    pub last_quote: Option<Quote>,
}

impl SessionState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            catalog: RateCatalog::seeded(config.mode, config.default_rate),
            batch: BatchLedger::new(),
            last_quote: None,
        }
    }
}

pub type SharedSession = Arc<Mutex<SessionState>>;

/// Session store backed by a moka cache with idle eviction.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, SharedSession>,
    config: Arc<AppConfig>,
}

impl SessionStore {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(10_000)
                .time_to_idle(config.session_ttl)
                .time_to_live(Duration::from_secs(24 * 60 * 60))
                .build(),
            config,
        }
    }

    /// Resolve the request's session, creating one when the cookie is
    /// missing or stale. Returns the state and, for a fresh session, the
    /// `Set-Cookie` value the response must carry.
    pub async fn acquire(&self, headers: &HeaderMap) -> (SharedSession, Option<String>) {
        let (sid, cookie) = match session_id_from_headers(headers) {
            Some(sid) => (sid, None),
            None => {
                let sid = Uuid::new_v4().to_string();
                tracing::debug!("New session: {}", sid);
                let cookie = format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly; SameSite=Lax");
                (sid, Some(cookie))
            }
        };

        let config = self.config.clone();
        let session = self
            .sessions
            .get_with(sid, async move {
                Arc::new(Mutex::new(SessionState::new(&config)))
            })
            .await;

        (session, cookie)
    }

    /// Store statistics for the monitoring endpoint.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            active_sessions: self.sessions.entry_count(),
        }
    }
}

/// Session store statistics for the monitoring endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub active_sessions: u64,
}

/// Extract a well-formed session id from the Cookie header.
fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && Uuid::parse_str(value).is_ok() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Lock a session for the duration of one command.
pub fn lock(session: &SharedSession) -> Result<MutexGuard<'_, SessionState>, AppError> {
    session
        .lock()
        .map_err(|_| AppError::Internal("session state lock poisoned".to_string()))
}

/// Attach a freshly minted session cookie to a response.
pub fn apply_cookie<B>(mut response: Response<B>, cookie: Option<String>) -> Response<B> {
    if let Some(cookie) = cookie {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().insert(SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingMode;
    use rust_decimal_macros::dec;

    fn test_config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            mode: PricingMode::Flat,
            default_rate: None,
            default_tax_percent: dec!(18),
            session_ttl: Duration::from_secs(60),
        })
    }

    fn cookie_headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[tokio::test]
    async fn test_acquire_without_cookie_creates_session() {
        let store = SessionStore::new(test_config());
        let (session, cookie) = store.acquire(&HeaderMap::new()).await;
        assert!(cookie.is_some());
        assert!(lock(&session).unwrap().batch.is_empty());
    }

    #[tokio::test]
    async fn test_acquire_with_cookie_reuses_state() {
        let store = SessionStore::new(test_config());
        let sid = Uuid::new_v4().to_string();
        let headers = cookie_headers(&format!("sid={sid}"));

        let (session, cookie) = store.acquire(&headers).await;
        assert!(cookie.is_none());
        lock(&session).unwrap().catalog.set("Okra", dec!(5.10));

        let (session, _) = store.acquire(&headers).await;
        assert_eq!(lock(&session).unwrap().catalog.get("Okra"), dec!(5.10));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = SessionStore::new(test_config());
        let a = cookie_headers(&format!("sid={}", Uuid::new_v4()));
        let b = cookie_headers(&format!("sid={}", Uuid::new_v4()));

        let (session_a, _) = store.acquire(&a).await;
        lock(&session_a).unwrap().catalog.set("Tomato", dec!(9.99));

        let (session_b, _) = store.acquire(&b).await;
        assert_eq!(lock(&session_b).unwrap().catalog.get("Tomato"), dec!(4.13));
    }

    #[test]
    fn test_session_stats_serialize() {
        let stats = SessionStats { active_sessions: 2 };
        assert_eq!(
            serde_json::to_string(&stats).unwrap(),
            r#"{"active_sessions":2}"#
        );
    }

    #[test]
    fn test_session_id_rejects_malformed_cookie() {
        assert!(session_id_from_headers(&cookie_headers("sid=not-a-uuid")).is_none());
        assert!(session_id_from_headers(&cookie_headers("other=1")).is_none());
        let sid = Uuid::new_v4().to_string();
        let headers = cookie_headers(&format!("theme=dark; sid={sid}"));
        assert_eq!(session_id_from_headers(&headers), Some(sid));
    }
}
