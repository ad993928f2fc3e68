pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod keys;
pub mod types;

pub use config::IndexerConfig;
pub use entities::*;
pub use error::PlasmaError;
pub use events::{ChainEvent, PlasmaEvent};
pub use keys::{EdgeKey, LogPosition};
pub use types::*;
