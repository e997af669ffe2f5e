use axum::{extract::State, response::Html};
use axum_extra::extract::cookie::CookieJar;
use compute::portfolio::portfolio;
use tracing::{instrument, trace};

use crate::schemas::AppState;
use crate::session::CurrentUser;
use crate::views::{Apology, IndexTemplate, render};

/// Show the portfolio of stocks with live prices
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn index(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<Html<String>, Apology> {
    trace!("Entering index function");
    let portfolio = portfolio(&state.db, state.quotes.as_ref(), user.id).await?;
    let flashes = state.sessions.take_flashes(&jar).await;
    render(&IndexTemplate::new(portfolio, flashes))
}
