use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while generating an EFD file.
///
/// Field-level problems (missing dates, absent amounts) are not errors:
/// the formatters degrade them to the layout's documented empty/zero
/// representation so one bad record cannot sink a whole period's filing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SpedError {
    /// The bookkeeping period starts after it ends.
    #[error("invalid period: start {start} is after end {end}")]
    InvalidPeriod {
        /// First day of the rejected period.
        start: NaiveDate,
        /// Last day of the rejected period.
        end: NaiveDate,
    },
}
