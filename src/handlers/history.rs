use axum::{extract::State, response::Html};
use axum_extra::extract::cookie::CookieJar;
use compute::portfolio::history;
use tracing::{debug, instrument};

use crate::schemas::AppState;
use crate::session::CurrentUser;
use crate::views::{Apology, HistoryRow, HistoryTemplate, render};

/// Show every buy and sell of the user, oldest first
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn history_page(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<Html<String>, Apology> {
    let entries = history(&state.db, user.id).await?;
    debug!("Rendering {} history rows", entries.len());

    render(&HistoryTemplate {
        flashes: state.sessions.take_flashes(&jar).await,
        logged_in: true,
        rows: entries.into_iter().map(HistoryRow::from).collect(),
    })
}
