//! Shared helpers for the Diesel repositories.
//!
//! - Mapping pool and Diesel failures onto each port's `connection`/`query`
//!   error constructors.
//! - [`TxError`] for carrying a port's guard error out of a transaction.
//! - [`RowError`] and the decode helpers used by `models.rs`.
//! - Calendar-day bounds for timestamp filters.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::Gnf;
use crate::domain::ports::{
    BankRepositoryError, DebtRepositoryError, ExpenseRepositoryError, InventoryRepositoryError,
    ReferenceRepositoryError, ReportRepositoryError, RestaurantRepositoryError,
    SaleRepositoryError, UserRepositoryError,
};

use super::pool::PoolError;

/// Port errors that carry the two infrastructure variants every repository
/// shares.
pub(crate) trait StoreError: Sized {
    /// Build the connection variant.
    fn connection_failed(message: String) -> Self;
    /// Build the query variant.
    fn query_failed(message: String) -> Self;
}

macro_rules! impl_store_error {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl StoreError for $ty {
                fn connection_failed(message: String) -> Self {
                    Self::connection(message)
                }

                fn query_failed(message: String) -> Self {
                    Self::query(message)
                }
            }
        )+
    };
}

impl_store_error!(
    BankRepositoryError,
    DebtRepositoryError,
    ExpenseRepositoryError,
    InventoryRepositoryError,
    ReferenceRepositoryError,
    ReportRepositoryError,
    RestaurantRepositoryError,
    SaleRepositoryError,
    UserRepositoryError,
);

/// Map a pool failure to the port's connection variant.
pub(crate) fn map_pool_error<E: StoreError>(error: PoolError) -> E {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            E::connection_failed(message)
        }
    }
}

/// Map a Diesel failure to the port's connection or query variant.
pub(crate) fn map_diesel_error<E: StoreError>(error: DieselError) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => E::query_failed("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => E::query_failed("database query error".to_owned()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection_failed("database connection error".to_owned())
        }
        _ => E::query_failed("database error".to_owned()),
    }
}

/// True when `error` is a unique violation on `constraint`.
pub(crate) fn is_unique_violation(error: &DieselError, constraint: &str) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(constraint)
    )
}

/// Error type for transaction closures: either Diesel failed or a guard
/// inside the transaction raised a port error, which also rolls back.
#[derive(Debug)]
pub(crate) enum TxError<E> {
    /// Database failure.
    Diesel(DieselError),
    /// Guard failure.
    Port(E),
}

impl<E> From<DieselError> for TxError<E> {
    fn from(value: DieselError) -> Self {
        Self::Diesel(value)
    }
}

impl<E> TxError<E> {
    /// Re-type the guard error, e.g. when one repository reuses another's
    /// transactional step.
    pub(crate) fn map_port<F>(self, f: impl FnOnce(E) -> F) -> TxError<F> {
        match self {
            Self::Diesel(error) => TxError::Diesel(error),
            Self::Port(error) => TxError::Port(f(error)),
        }
    }
}

impl<E: StoreError> TxError<E> {
    /// Collapse into the port error.
    pub(crate) fn into_port(self) -> E {
        match self {
            Self::Diesel(error) => map_diesel_error(error),
            Self::Port(error) => error,
        }
    }
}

impl<E: StoreError> From<RowError> for TxError<E> {
    fn from(value: RowError) -> Self {
        Self::Port(value.into_port())
    }
}

/// A stored value that no longer decodes into its domain type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {column} is invalid: {message}")]
pub(crate) struct RowError {
    column: &'static str,
    message: String,
}

impl RowError {
    pub(crate) fn new(column: &'static str, cause: impl Display) -> Self {
        Self {
            column,
            message: cause.to_string(),
        }
    }

    /// Report as the port's query variant.
    pub(crate) fn into_port<E: StoreError>(self) -> E {
        E::query_failed(self.to_string())
    }
}

/// Parse a text code column.
pub(crate) fn decode_code<T>(column: &'static str, raw: &str) -> Result<T, RowError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|err| RowError::new(column, err))
}

/// Decode a `BIGINT` amount column.
pub(crate) fn decode_gnf(column: &'static str, raw: i64) -> Result<Gnf, RowError> {
    Gnf::new(raw).map_err(|err| RowError::new(column, err))
}

/// Decode a small non-negative `INTEGER` column.
pub(crate) fn decode_u16(column: &'static str, raw: i32) -> Result<u16, RowError> {
    u16::try_from(raw).map_err(|err| RowError::new(column, err))
}

/// First instant of `day` in UTC.
pub(crate) fn day_start(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

/// First instant after `day` in UTC.
pub(crate) fn day_end_exclusive(day: NaiveDate) -> DateTime<Utc> {
    day.succ_opt().map_or(DateTime::<Utc>::MAX_UTC, day_start)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the shared mappers.
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let err: SaleRepositoryError = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, SaleRepositoryError::connection("timed out"));
    }

    #[rstest]
    fn not_found_becomes_a_query_error() {
        let err: DebtRepositoryError = map_diesel_error(DieselError::NotFound);
        assert_eq!(err, DebtRepositoryError::query("record not found"));
    }

    #[rstest]
    fn guard_errors_survive_the_transaction() {
        let err: TxError<ExpenseRepositoryError> =
            TxError::Port(ExpenseRepositoryError::not_pending());
        assert_eq!(err.into_port(), ExpenseRepositoryError::NotPending);
    }

    #[rstest]
    fn row_errors_name_the_column() {
        let err = decode_code::<crate::domain::PaymentMethod>("method", "cheque")
            .expect_err("unknown method");
        assert!(err.to_string().starts_with("stored method is invalid"));
    }

    #[rstest]
    #[case(-1)]
    #[case(70_000)]
    fn out_of_range_small_integers_are_rejected(#[case] raw: i32) {
        assert!(decode_u16("shelf_life_days", raw).is_err());
    }

    #[rstest]
    fn day_bounds_cover_the_whole_day() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).expect("date");
        assert_eq!(day_start(day).to_rfc3339(), "2026-03-10T00:00:00+00:00");
        assert_eq!(
            day_end_exclusive(day).to_rfc3339(),
            "2026-03-11T00:00:00+00:00"
        );
    }
}
