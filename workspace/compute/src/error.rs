use thiserror::Error;

/// Error types for the compute module.
///
/// The `Display` text of the client-side variants is shown to the user as is,
/// so it is kept short and lower-case.
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// No symbol was submitted
    #[error("missing symbol")]
    MissingSymbol,

    /// The quote provider does not know the symbol
    #[error("invalid symbol")]
    InvalidSymbol,

    /// Buy share count is not a positive integer
    #[error("shares must be positive integer")]
    InvalidShares,

    /// Sell share count is missing or negative
    #[error("missing shares")]
    MissingShares,

    /// Purchase costs more than the available cash
    #[error("can't afford")]
    CannotAfford,

    /// Sale exceeds the current holding
    #[error("too many shares")]
    TooManyShares,

    /// The session refers to a user that no longer exists
    #[error("user {0} not found")]
    UserNotFound(i32),

    /// A held symbol could not be priced
    #[error("quote unavailable for {0}")]
    QuoteUnavailable(String),
}

impl ComputeError {
    /// Whether the error was caused by the submitted input rather than by the
    /// system or one of its collaborators.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ComputeError::MissingSymbol
                | ComputeError::InvalidSymbol
                | ComputeError::InvalidShares
                | ComputeError::MissingShares
                | ComputeError::CannotAfford
                | ComputeError::TooManyShares
        )
    }
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
