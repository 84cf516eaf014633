/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while building or reporting a simulation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The initial cash is not positive. A simulation needs capital to size against.
    #[error("Initial cash must be positive (got: {0})")]
    NegZeroCash(f64),

    /// The split count is zero. Units are sized as `virtual seed / split count`.
    #[error("Split count must be at least 1")]
    ZeroSplitCount,

    /// The reference-price reset period is zero trading days.
    #[error("Reset period must be at least 1 trading day")]
    ZeroResetPeriod,

    /// The invested-ratio buy cap is outside `(0, 1]`.
    #[error("Invested-ratio cap must be within (0, 1] (got: {0})")]
    InvestedCap(f64),

    /// A retention fraction (profit or loss side) is outside `[0, 1]`.
    #[error("Retention fraction must be within [0, 1] (got: {0})")]
    Retention(f64),

    /// A gear band width is outside `(0, 1)`.
    #[error("Band width must be a fraction within (0, 1) (got: {0})")]
    BandWidth(f64),

    /// A closing price is not a positive finite number.
    #[error("Close price must be positive and finite (got: {0})")]
    ClosePrice(f64),

    /// A required observation field was not set on the builder.
    #[error("Missing observation field: {0}")]
    MissingField(&'static str),

    /// Generic message error.
    #[error("{0}")]
    Msg(String),

    /// I/O error occurred.
    // provider.rs
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error occurred.
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Chart rendering error occurred.
    #[cfg(feature = "draws")]
    #[error("Drawing error: {0}")]
    Plotters(String),
}
