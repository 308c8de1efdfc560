//! Access control and membership engine for shared task boards

pub mod config;
pub mod core_board;
pub mod logging;
pub mod metrics;
pub mod test_utils;

pub use config::Config;
pub use core_board::{BoardError, BoardManagerImpl, Role, UserId};
pub use logging::{init_logging, LogLevel};
