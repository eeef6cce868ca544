//! Amounts are stored as integer cents and exchanged as decimal numbers.

use serde::Serializer;

use crate::error::{AppError, AppResult};

/// Largest amount, in currency units, a single request may carry.
pub const MAX_AMOUNT: f64 = 1e12;

pub fn cents_from_decimal(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

pub fn decimal_from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Convert a client-supplied amount that must be strictly positive.
pub fn positive_cents(field: &str, amount: f64) -> AppResult<i64> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(AppError::Validation(format!(
            "{} must be a positive number",
            field
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(AppError::Validation(format!(
            "{} must not exceed {}",
            field, MAX_AMOUNT
        )));
    }
    let cents = cents_from_decimal(amount);
    if cents == 0 {
        return Err(AppError::Validation(format!(
            "{} must be at least 0.01",
            field
        )));
    }
    Ok(cents)
}

/// Convert a signed adjustment such as a spend delta.
pub fn delta_cents(field: &str, amount: f64) -> AppResult<i64> {
    if !amount.is_finite() {
        return Err(AppError::Validation(format!("{} must be a number", field)));
    }
    if amount.abs() > MAX_AMOUNT {
        return Err(AppError::Validation(format!(
            "{} must not exceed {} in either direction",
            field, MAX_AMOUNT
        )));
    }
    Ok(cents_from_decimal(amount))
}

/// Sum cent values, failing instead of wrapping.
pub fn checked_total<I>(values: I) -> AppResult<i64>
where
    I: IntoIterator<Item = i64>,
{
    values
        .into_iter()
        .try_fold(0i64, i64::checked_add)
        .ok_or_else(out_of_range)
}

/// Add a delta to a running balance, failing instead of wrapping.
pub fn checked_add_cents(balance: i64, delta: i64) -> AppResult<i64> {
    balance.checked_add(delta).ok_or_else(out_of_range)
}

fn out_of_range() -> AppError {
    AppError::Validation("Totals exceed the supported range".into())
}

pub fn format_cents(cents: i64) -> String {
    let is_negative = cents < 0;
    let abs_cents = cents.abs();
    let dollars = abs_cents / 100;
    let remainder = abs_cents % 100;

    if is_negative {
        format!("-{}.{:02}", dollars, remainder)
    } else {
        format!("{}.{:02}", dollars, remainder)
    }
}

pub fn serialize_cents<S: Serializer>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(decimal_from_cents(*cents))
}
