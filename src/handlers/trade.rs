use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use compute::holdings::held_symbols;
use compute::trade;
use tracing::{info, instrument, trace};

use crate::schemas::{AppState, TradeForm};
use crate::session::CurrentUser;
use crate::views::{Apology, BuyTemplate, SellTemplate, render};

/// Show the buy form
pub async fn buy_form(
    State(state): State<AppState>,
    _user: CurrentUser,
    jar: CookieJar,
) -> Result<Html<String>, Apology> {
    render(&BuyTemplate {
        flashes: state.sessions.take_flashes(&jar).await,
        logged_in: true,
    })
}

/// Buy shares of a stock
#[instrument(skip_all, fields(user_id = user.id, symbol = %form.symbol, shares = %form.shares))]
pub async fn buy(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Form(form): Form<TradeForm>,
) -> Result<Response, Apology> {
    trace!("Entering buy function");
    let recorded = trade::buy(
        &state.db,
        state.quotes.as_ref(),
        user.id,
        &form.symbol,
        &form.shares,
    )
    .await?;
    info!("Purchase recorded with ID: {}", recorded.id);

    let jar = state.sessions.flash(jar, "Bought!").await;
    Ok((jar, Redirect::to("/")).into_response())
}

/// Show the sell form with the symbols the user currently holds
#[instrument(skip_all, fields(user_id = user.id))]
pub async fn sell_form(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
) -> Result<Html<String>, Apology> {
    let symbols = held_symbols(&state.db, user.id).await?;
    render(&SellTemplate {
        flashes: state.sessions.take_flashes(&jar).await,
        logged_in: true,
        symbols,
    })
}

/// Sell shares of a stock
#[instrument(skip_all, fields(user_id = user.id, symbol = %form.symbol, shares = %form.shares))]
pub async fn sell(
    State(state): State<AppState>,
    user: CurrentUser,
    jar: CookieJar,
    Form(form): Form<TradeForm>,
) -> Result<Response, Apology> {
    trace!("Entering sell function");
    let recorded = trade::sell(
        &state.db,
        state.quotes.as_ref(),
        user.id,
        &form.symbol,
        &form.shares,
    )
    .await?;
    info!("Sale recorded with ID: {}", recorded.id);

    let jar = state.sessions.flash(jar, "Sold!").await;
    Ok((jar, Redirect::to("/")).into_response())
}
