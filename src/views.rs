//! HTML pages.
//!
//! Every page extends `layout.html`, which needs the `flashes` and
//! `logged_in` fields. Money is formatted before it reaches a template.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use common::{HistoryEntry, Holding, Portfolio, Quote, usd};
use compute::ComputeError;
use tracing::{error, warn};

/// Renders a template, turning a rendering failure into a 500 apology.
pub fn render<T: Template>(template: &T) -> Result<Html<String>, Apology> {
    template.render().map(Html).map_err(|e| {
        error!("Failed to render template: {}", e);
        Apology::internal()
    })
}

/// The uniform error page: a message and the HTTP status it is served with.
#[derive(Debug, Clone)]
pub struct Apology {
    pub status: StatusCode,
    pub message: String,
}

impl Apology {
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST)
    }

    pub fn internal() -> Self {
        Self::new("Internal Server Error", StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ComputeError> for Apology {
    fn from(err: ComputeError) -> Self {
        if err.is_client_error() {
            return Apology::bad_request(err.to_string());
        }
        match err {
            ComputeError::QuoteUnavailable(_) => {
                warn!("{}", err);
                Apology::new(err.to_string(), StatusCode::BAD_GATEWAY)
            }
            other => {
                error!("Request failed: {}", other);
                Apology::internal()
            }
        }
    }
}

impl From<sea_orm::DbErr> for Apology {
    fn from(err: sea_orm::DbErr) -> Self {
        ComputeError::from(err).into()
    }
}

#[derive(Template)]
#[template(path = "apology.html")]
struct ApologyTemplate<'a> {
    flashes: Vec<String>,
    logged_in: bool,
    code: u16,
    message: &'a str,
}

impl IntoResponse for Apology {
    fn into_response(self) -> Response {
        let page = ApologyTemplate {
            flashes: Vec::new(),
            logged_in: false,
            code: self.status.as_u16(),
            message: &self.message,
        };
        match page.render() {
            Ok(body) => (self.status, Html(body)).into_response(),
            Err(e) => {
                error!("Failed to render apology: {}", e);
                (self.status, self.message).into_response()
            }
        }
    }
}

/// Holding row with preformatted money columns.
pub struct HoldingRow {
    pub symbol: String,
    pub name: String,
    pub shares: i64,
    pub price: String,
    pub total: String,
}

impl From<Holding> for HoldingRow {
    fn from(holding: Holding) -> Self {
        Self {
            price: usd(holding.price),
            total: usd(holding.value),
            symbol: holding.symbol,
            name: holding.name,
            shares: holding.shares,
        }
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub flashes: Vec<String>,
    pub logged_in: bool,
    pub rows: Vec<HoldingRow>,
    pub cash: String,
    pub grand_total: String,
}

impl IndexTemplate {
    pub fn new(portfolio: Portfolio, flashes: Vec<String>) -> Self {
        Self {
            flashes,
            logged_in: true,
            cash: usd(portfolio.cash),
            grand_total: usd(portfolio.grand_total),
            rows: portfolio.holdings.into_iter().map(HoldingRow::from).collect(),
        }
    }
}

/// History row with preformatted columns.
pub struct HistoryRow {
    pub action: &'static str,
    pub symbol: String,
    pub shares: i64,
    pub price: String,
    pub transacted: String,
}

impl From<HistoryEntry> for HistoryRow {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            action: if entry.bought { "Bought" } else { "Sold" },
            symbol: entry.symbol,
            shares: entry.shares,
            price: usd(entry.price),
            transacted: entry.transacted.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "history.html")]
pub struct HistoryTemplate {
    pub flashes: Vec<String>,
    pub logged_in: bool,
    pub rows: Vec<HistoryRow>,
}

#[derive(Template)]
#[template(path = "buy.html")]
pub struct BuyTemplate {
    pub flashes: Vec<String>,
    pub logged_in: bool,
}

#[derive(Template)]
#[template(path = "sell.html")]
pub struct SellTemplate {
    pub flashes: Vec<String>,
    pub logged_in: bool,
    pub symbols: Vec<String>,
}

#[derive(Template)]
#[template(path = "quote.html")]
pub struct QuoteTemplate {
    pub flashes: Vec<String>,
    pub logged_in: bool,
}

#[derive(Template)]
#[template(path = "quoted.html")]
pub struct QuotedTemplate {
    pub flashes: Vec<String>,
    pub logged_in: bool,
    pub name: String,
    pub symbol: String,
    pub price: String,
}

impl QuotedTemplate {
    pub fn new(quote: Quote, flashes: Vec<String>) -> Self {
        Self {
            flashes,
            logged_in: true,
            price: usd(quote.price),
            name: quote.name,
            symbol: quote.symbol,
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub flashes: Vec<String>,
    pub logged_in: bool,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub flashes: Vec<String>,
    pub logged_in: bool,
}
