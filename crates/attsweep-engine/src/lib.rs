pub mod cancel;
pub mod catalog;
pub mod config;
pub mod deleter;
pub mod error;
pub mod session;

pub use cancel::CancelToken;
pub use catalog::build_catalog;
pub use config::EngineConfig;
pub use deleter::{delete_selected, BatchReport};
pub use error::EngineError;
pub use session::{Session, SweepOutcome};
