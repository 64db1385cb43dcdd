//! spendify-domain
//!
//! Pure domain models (Expense, Category, UserProfile, DebtRecord, periods).
//! No I/O, no CLI, no storage. Only data types and core enums.

pub mod category;
pub mod common;
pub mod debt;
pub mod expense;
pub mod period;
pub mod user;

pub use category::*;
pub use common::*;
pub use debt::*;
pub use expense::*;
pub use period::*;
pub use user::*;
