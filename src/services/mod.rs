pub mod achievements;
pub mod price_updater;
pub mod rankings;
pub mod settlement;
pub mod trade_exec;
