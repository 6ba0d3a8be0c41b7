//! hearth-domain
//!
//! Pure domain models (users, budget periods, accounts, transactions, recurring series, reports).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod account;
pub mod common;
pub mod household;
pub mod period;
pub mod recurring;
pub mod report;
pub mod transaction;
pub mod user;

pub use account::*;
pub use common::*;
pub use household::*;
pub use period::*;
pub use recurring::*;
pub use report::*;
pub use transaction::*;
pub use user::*;
