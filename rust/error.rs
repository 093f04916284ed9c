//! Error taxonomy shared by every fallible constructor in the crate.

use chrono::NaiveDateTime;

/// Result type for period operations.
pub type PeriodResult<T> = Result<T, PeriodError>;

/// Error type for period construction and segmentation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PeriodError {
    /// The date input is malformed or out of calendar range.
    #[error("Invalid date definition: {0}")]
    InvalidDateSpec(String),

    /// The resolved end of a period precedes its start.
    #[error("Invalid period: end [{tce}] before start [{tcs}]")]
    InvalidPeriod {
        tcs: NaiveDateTime,
        tce: NaiveDateTime,
    },

    /// The segmentation unit is not one of `day`, `isoweek`, `month` or `year`.
    #[error("Unknown segment duration: `{0}` [day, isoweek, month, year]")]
    UnknownSegmentDuration(String),

    /// The parameters of an exclusion rule are out of range.
    #[error("Invalid exclusion rule: {0}")]
    InvalidExclusionRule(String),

    /// A strftime format string could not be rendered.
    #[error("Invalid datetime format: `{0}`")]
    InvalidFormat(String),
}

impl PeriodError {
    pub(crate) fn date_spec(msg: impl Into<String>) -> Self {
        PeriodError::InvalidDateSpec(msg.into())
    }
}
