//! In-memory browser sessions
//!
//! A session remembers the password gate outcome and the current upload for
//! one browser. Sessions live only in memory and the oldest is evicted once
//! the configured capacity is reached.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use salesdash_core::{AccessState, UploadState};
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "salesdash_session";

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub access: AccessState,
    pub upload: UploadState,
}

#[derive(Default)]
struct SessionMap {
    sessions: HashMap<String, Session>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
}

pub struct SessionStore {
    inner: RwLock<SessionMap>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: RwLock::new(SessionMap::default()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Snapshot of a session; unknown ids read as a fresh locked session
    pub async fn get(&self, id: &str) -> Session {
        self.inner.read().await.sessions.get(id).cloned().unwrap_or_default()
    }

    /// Modify a session, creating it first if needed
    pub async fn update<F>(&self, id: &str, f: F)
    where
        F: FnOnce(&mut Session),
    {
        let mut map = self.inner.write().await;
        if !map.sessions.contains_key(id) {
            while map.sessions.len() >= self.max_sessions {
                let Some(oldest) = map.order.pop_front() else { break };
                map.sessions.remove(&oldest);
                log::debug!("Evicted session {}", oldest);
            }
            map.sessions.insert(id.to_string(), Session::default());
            map.order.push_back(id.to_string());
        }
        if let Some(session) = map.sessions.get_mut(id) {
            f(session);
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Return the session id carried by the request, issuing a new cookie when
/// the request has none or an unparseable one.
pub fn ensure_session(jar: CookieJar) -> (CookieJar, String) {
    let existing = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| Uuid::parse_str(v).is_ok());
    if let Some(id) = existing {
        return (jar, id);
    }

    let id = Uuid::new_v4().to_string();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), id)
}
