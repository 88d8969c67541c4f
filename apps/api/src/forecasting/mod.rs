// Resume Version Performance Forecasting
// Implements: weekly aggregation, trend fitting, confidence tiers, forecast
// assembly, remote forecast adaptation, best-variant selection.
// All calls to the learned forecast service go through forecast_client.

pub mod aggregator;
pub mod assembler;
pub mod confidence;
pub mod handlers;
pub mod history;
pub mod policy;
pub mod recommendation;
pub mod remote;
pub mod selector;
pub mod service;
pub mod trend;
