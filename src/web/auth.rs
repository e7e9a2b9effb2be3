//! Sign-in gate and session cookies

use crate::error::TubedropError;
use crate::Result;
use async_trait::async_trait;
use axum::http::{header, HeaderMap};
use rand::RngCore;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "tubedrop_session";

/// How long a session stays valid after login
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Upper bound on live sessions; the oldest is dropped beyond it
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Who is making the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub name: String,
    pub token: String,
}

/// Decides who may use the page
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Start a session for `name`, or reject the attempt
    async fn login(&self, name: &str, password: &str) -> Result<UserContext>;

    /// Resolve a session token
    async fn lookup(&self, token: &str) -> Option<UserContext>;

    /// End a session; returns whether it existed
    async fn logout(&self, token: &str) -> bool;

    /// Whether the login form needs a password field
    fn requires_password(&self) -> bool {
        false
    }
}

#[derive(Debug)]
struct Session {
    name: String,
    created: Instant,
}

/// Session table kept in memory for the lifetime of the process
///
/// Sessions expire `ttl` after login. Expired entries are purged on the next
/// login, and the table never holds more than `max_sessions` entries.
#[derive(Debug)]
pub struct MemorySessions {
    password: Option<String>,
    ttl: Duration,
    max_sessions: usize,
    sessions: RwLock<HashMap<String, Session>>,
}

impl Default for MemorySessions {
    fn default() -> Self {
        Self {
            password: None,
            ttl: DEFAULT_SESSION_TTL,
            max_sessions: DEFAULT_MAX_SESSIONS,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

impl MemorySessions {
    /// Accept any non-blank name
    pub fn new() -> Self {
        Self::default()
    }

    /// Additionally require `password` on login
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        let password = password.into();
        self.password = if password.is_empty() {
            None
        } else {
            Some(password)
        };
        self
    }

    /// Set how long a session lasts
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum number of live sessions (at least one)
    pub fn with_max_sessions(mut self, max_sessions: usize) -> Self {
        self.max_sessions = max_sessions.max(1);
        self
    }

    fn is_expired(&self, session: &Session) -> bool {
        session.created.elapsed() >= self.ttl
    }
}

#[async_trait]
impl IdentityProvider for MemorySessions {
    async fn login(&self, name: &str, password: &str) -> Result<UserContext> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TubedropError::LoginRejected(
                "名前を入力してください。".to_string(),
            ));
        }
        if let Some(expected) = &self.password {
            if password != expected {
                info!("Rejected login for {:?}", name);
                return Err(TubedropError::LoginRejected(
                    "パスワードが正しくありません。".to_string(),
                ));
            }
        }

        let token = new_token();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session));
        if sessions.len() < before {
            debug!("Purged {} expired sessions", before - sessions.len());
        }
        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, session)| session.created)
                .map(|(token, _)| token.clone());
            match oldest {
                Some(oldest) => {
                    sessions.remove(&oldest);
                }
                None => break,
            }
        }

        sessions.insert(
            token.clone(),
            Session {
                name: name.to_string(),
                created: Instant::now(),
            },
        );
        info!("Signed in {:?} ({} active sessions)", name, sessions.len());

        Ok(UserContext {
            name: name.to_string(),
            token,
        })
    }

    async fn lookup(&self, token: &str) -> Option<UserContext> {
        {
            let sessions = self.sessions.read().await;
            let session = sessions.get(token)?;
            if !self.is_expired(session) {
                return Some(UserContext {
                    name: session.name.clone(),
                    token: token.to_string(),
                });
            }
        }

        if let Some(session) = self.sessions.write().await.remove(token) {
            debug!("Session for {:?} expired", session.name);
        }
        None
    }

    fn requires_password(&self) -> bool {
        self.password.is_some()
    }

    async fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        if let Some(session) = &removed {
            info!("Signed out {:?}", session.name);
        }
        removed.is_some()
    }
}

/// 128 random bits, hex encoded
fn new_token() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Value of cookie `name` from the request's `Cookie` headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Pull the session token out of the request's `Cookie` headers
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, SESSION_COOKIE)
}

/// Resolve the signed-in user for a request, if any
pub async fn current_user(
    identity: &dyn IdentityProvider,
    headers: &HeaderMap,
) -> Option<UserContext> {
    let token = session_token(headers)?;
    let user = identity.lookup(&token).await;
    if user.is_none() {
        debug!("Unknown session token presented");
    }
    user
}

/// `Set-Cookie` value establishing a session
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE, token
    )
}

/// `Set-Cookie` value removing the session cookie
pub fn cleared_cookie() -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    )
}
