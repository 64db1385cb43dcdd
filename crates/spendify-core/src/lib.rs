//! spendify-core
//!
//! Business logic and services for Spendify.
//! Depends on spendify-domain. No CLI, no terminal I/O. The hosted backend,
//! the device key store and network reachability are reached through traits.

pub mod analytics_service;
pub mod auth_service;
pub mod backend;
pub mod budget_service;
pub mod category_service;
pub mod connectivity;
pub mod debt_service;
pub mod error;
pub mod expense_service;
pub mod export_service;
pub mod keystore;
pub mod sync_service;
pub mod time;

pub use analytics_service::*;
pub use auth_service::*;
pub use backend::{Backend, BackendTables, ExpenseQuery, InMemoryBackend};
pub use budget_service::*;
pub use category_service::*;
pub use connectivity::{Connectivity, NetworkStatus};
pub use debt_service::*;
pub use error::CoreError;
pub use expense_service::*;
pub use export_service::*;
pub use keystore::{MemorySecureStore, SecureStore};
pub use sync_service::*;
pub use time::{Clock, FixedClock, SystemClock};
