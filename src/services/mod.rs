pub mod aggregator;
pub mod ai_client;
pub mod debt;
pub mod insights;
