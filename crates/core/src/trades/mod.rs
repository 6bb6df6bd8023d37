//! Trades module - trade records and the derived-metrics calculator.

mod trades_calculator;
mod trades_model;
mod trades_service;
mod trades_traits;


#[cfg(test)]
mod trades_service_tests;

// Re-export the public interface
pub use trades_calculator::{calculate_metrics, MetricsInput, TradeMetrics};
pub use trades_model::{
    CloseTrade, NewTrade, Trade, TradeDirection, TradeResult, TradeStatus, TradeUpdate,
};
pub use trades_service::TradeService;
pub use trades_traits::{TradeRepositoryTrait, TradeServiceTrait};
