//! Model checker for knowing-how logic over labeled transition systems.

pub mod checker;
pub mod dot;
pub mod error;
pub mod frontier;
pub mod lts;

pub use checker::{CheckConfig, ModelChecker};
pub use dot::{lts_to_dot, parse_lts, DotError};
pub use error::{CheckError, CheckResult};
pub use frontier::Frontier;
pub use lts::Lts;
