use serde::{Deserialize, Serialize};

/// Body of `POST /api/ai/debt-simulation-with-income-expenses`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSimulationRequest {
    pub debt_amount: Option<f64>,
    pub interest_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebtSimulationInput {
    pub debt_amount: f64,
    /// Annual rate in percent, e.g. `12.0` for 12 %.
    pub interest_rate: f64,
    pub available_payment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSimulation {
    pub months: u32,
    pub total_interest: f64,
    pub available_payment: f64,
}
