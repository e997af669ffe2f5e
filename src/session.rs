//! Server-side sessions.
//!
//! The browser only holds a random id in the `session` cookie; the logged-in
//! user and pending flash messages live in process memory and expire after a
//! period of inactivity. Restarting the server logs everybody out.

use std::time::Duration;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use moka::future::Cache;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::schemas::AppState;

pub const SESSION_COOKIE: &str = "session";

const MAX_SESSIONS: u64 = 100_000;

/// State kept for one browser.
#[derive(Clone, Debug, Default)]
pub struct SessionData {
    pub user_id: Option<i32>,
    pub flashes: Vec<String>,
}

/// In-memory session store shared by all handlers.
#[derive(Clone, Debug)]
pub struct SessionStore {
    sessions: Cache<String, SessionData>,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(idle_timeout)
            .build();
        Self { sessions }
    }

    fn session_id(jar: &CookieJar) -> Option<String> {
        jar.get(SESSION_COOKIE).map(|cookie| cookie.value().to_string())
    }

    fn cookie(id: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
    }

    async fn load(&self, jar: &CookieJar) -> Option<(String, SessionData)> {
        let id = Self::session_id(jar)?;
        let data = self.sessions.get(&id).await?;
        Some((id, data))
    }

    /// Id of the logged-in user, if any.
    pub async fn user_id(&self, jar: &CookieJar) -> Option<i32> {
        self.load(jar).await.and_then(|(_, data)| data.user_id)
    }

    /// Forgets the current session and expires its cookie.
    pub async fn clear(&self, jar: CookieJar) -> CookieJar {
        match Self::session_id(&jar) {
            Some(id) => {
                trace!("Clearing session {}", id);
                self.sessions.invalidate(&id).await;
                jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
            }
            None => jar,
        }
    }

    /// Starts a fresh session for `user_id`. Any previous session is dropped
    /// so a session id is never reused across logins.
    pub async fn login(&self, jar: CookieJar, user_id: i32) -> CookieJar {
        let jar = self.clear(jar).await;
        let id = Uuid::new_v4().to_string();
        debug!("User {} logged in", user_id);
        self.sessions
            .insert(
                id.clone(),
                SessionData {
                    user_id: Some(user_id),
                    flashes: Vec::new(),
                },
            )
            .await;
        jar.add(Self::cookie(id))
    }

    /// Queues a message for the next rendered page, creating an anonymous
    /// session when there is none.
    pub async fn flash(&self, jar: CookieJar, message: impl Into<String>) -> CookieJar {
        let message = message.into();
        match self.load(&jar).await {
            Some((id, mut data)) => {
                data.flashes.push(message);
                self.sessions.insert(id, data).await;
                jar
            }
            None => {
                let id = Uuid::new_v4().to_string();
                self.sessions
                    .insert(
                        id.clone(),
                        SessionData {
                            user_id: None,
                            flashes: vec![message],
                        },
                    )
                    .await;
                jar.add(Self::cookie(id))
            }
        }
    }

    /// Removes and returns the queued flash messages.
    pub async fn take_flashes(&self, jar: &CookieJar) -> Vec<String> {
        match self.load(jar).await {
            Some((id, mut data)) if !data.flashes.is_empty() => {
                let flashes = std::mem::take(&mut data.flashes);
                self.sessions.insert(id, data).await;
                flashes
            }
            _ => Vec::new(),
        }
    }
}

/// The logged-in user. Extracting it from a request without a valid session
/// redirects to the login page.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: i32,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match state.sessions.user_id(&jar).await {
            Some(id) => Ok(CurrentUser { id }),
            None => {
                trace!("No logged-in user for {}, redirecting to login", parts.uri);
                Err(Redirect::to("/login"))
            }
        }
    }
}
