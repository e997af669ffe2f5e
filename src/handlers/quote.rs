use axum::{Form, extract::State, response::Html};
use axum_extra::extract::cookie::CookieJar;
use compute::ComputeError;
use compute::quote::normalize_symbol;
use tracing::{debug, instrument};

use crate::handlers::validate_form;
use crate::schemas::{AppState, QuoteForm};
use crate::session::CurrentUser;
use crate::views::{Apology, QuoteTemplate, QuotedTemplate, render};

/// Show the quote lookup form
pub async fn quote_form(
    State(state): State<AppState>,
    _user: CurrentUser,
    jar: CookieJar,
) -> Result<Html<String>, Apology> {
    render(&QuoteTemplate {
        flashes: state.sessions.take_flashes(&jar).await,
        logged_in: true,
    })
}

/// Look up a stock quote
#[instrument(skip_all, fields(user_id = user.id, symbol = %form.symbol))]
pub async fn quote(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Form(form): Form<QuoteForm>,
) -> Result<Html<String>, Apology> {
    let form = QuoteForm {
        symbol: normalize_symbol(&form.symbol),
    };
    validate_form(&form, QuoteForm::FIELDS)?;

    let Some(quote) = state.quotes.lookup(&form.symbol).await else {
        debug!("No quote for {}", form.symbol);
        return Err(ComputeError::InvalidSymbol.into());
    };

    let flashes = state.sessions.take_flashes(&jar).await;
    render(&QuotedTemplate::new(quote, flashes))
}
