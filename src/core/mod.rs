pub mod app;
pub mod errors;
pub mod utils;

pub use app::Spendify;
pub use errors::{AppError, CliError};
