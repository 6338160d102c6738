pub mod compromise_engine;
pub mod feedback_log;
pub mod guide;
pub mod preferences_adapter;
pub mod strategies;
pub mod strategy_registry;
pub mod strategy_selector;

pub use compromise_engine::{CompromiseEngine, CompromiseEngineBuilder};
pub use feedback_log::FeedbackLog;
pub use preferences_adapter::{GatedStrategy, PreferencesAdapter};
pub use strategy_registry::StrategyRegistry;
pub use strategy_selector::{SelectionResult, StrategySelector};
