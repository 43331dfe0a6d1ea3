//! Settings loading and management for the fee schedule engine.
//!
//! Engine settings cover the currency scale, the installment ceiling and the
//! due date cadence. They are loaded from YAML or taken from defaults.
//!
//! # Example
//!
//! ```no_run
//! use fee_schedule_engine::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load("./config").unwrap();
//! println!("Cadence: {:?}", loader.settings().cadence);
//! ```

mod loader;
mod types;

pub use loader::{ConfigLoader, SETTINGS_FILE};
pub use types::{Cadence, DEFAULT_MAX_INSTALLMENTS, EngineSettings, MAX_CURRENCY_SCALE};
