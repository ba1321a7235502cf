//! Password form handler

use crate::session::ensure_session;
use crate::AppState;
use axum::extract::State;
use axum::response::Redirect;
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct UnlockForm {
    #[serde(default)]
    pub password: String,
}

/// Check the entered password and remember the outcome for the session.
/// A wrong password locks the session again.
pub async fn unlock(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<UnlockForm>,
) -> (CookieJar, Redirect) {
    let (jar, session_id) = ensure_session(jar);
    let access = state.gate.check(&form.password);

    if access.is_unlocked() {
        log::info!("Session {} unlocked", session_id);
    } else {
        log::warn!("Rejected password for session {}", session_id);
    }

    state.sessions.update(&session_id, |session| session.access = access).await;
    (jar, Redirect::to("/"))
}
