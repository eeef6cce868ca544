use thiserror::Error;

use crate::models::{DebtSimulation, DebtSimulationInput};

/// Longest payoff schedule the simulator will project (100 years).
pub const MAX_MONTHS: u32 = 1200;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DebtError {
    #[error("debtAmount must be greater than zero")]
    InvalidDebtAmount,

    #[error("interestRate must be greater than zero")]
    InvalidInterestRate,

    #[error(
        "Your income does not exceed your expenses, so there is nothing available to pay \
         off debt (available payment: {available_payment:.2})"
    )]
    NoAvailablePayment { available_payment: f64 },

    #[error(
        "A monthly payment of {payment:.2} is insufficient to amortize this debt: \
         the first month alone accrues {first_month_interest:.2} in interest"
    )]
    PaymentInsufficient {
        payment: f64,
        first_month_interest: f64,
    },
}

/// Project how long a fixed monthly payment takes to clear a debt.
///
/// Each month the balance accrues `annual_rate / 100 / 12` interest and is then
/// reduced by the payment; the count stops at the first month that brings the
/// balance to zero or below. Interest is accumulated in the same pass.
pub fn simulate(input: &DebtSimulationInput) -> Result<DebtSimulation, DebtError> {
    let DebtSimulationInput {
        debt_amount,
        interest_rate,
        available_payment: payment,
    } = *input;

    if !debt_amount.is_finite() || debt_amount <= 0.0 {
        return Err(DebtError::InvalidDebtAmount);
    }
    if !interest_rate.is_finite() || interest_rate <= 0.0 {
        return Err(DebtError::InvalidInterestRate);
    }
    if !payment.is_finite() || payment <= 0.0 {
        return Err(DebtError::NoAvailablePayment {
            available_payment: payment,
        });
    }

    let monthly_rate = interest_rate / 100.0 / 12.0;
    let first_month_interest = debt_amount * monthly_rate;
    let insufficient = DebtError::PaymentInsufficient {
        payment,
        first_month_interest,
    };

    // The balance only shrinks if the payment beats the interest it accrues.
    if payment <= first_month_interest {
        return Err(insufficient);
    }

    let mut balance = debt_amount;
    let mut months = 0u32;
    let mut total_interest = 0.0;

    while balance > 0.0 {
        if months >= MAX_MONTHS {
            return Err(insufficient);
        }
        let interest = balance * monthly_rate;
        total_interest += interest;
        balance = balance + interest - payment;
        months += 1;
    }

    tracing::debug!(months, total_interest, "Simulated debt payoff");

    Ok(DebtSimulation {
        months,
        total_interest,
        available_payment: payment,
    })
}
