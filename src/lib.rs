#![doc(test(attr(deny(warnings))))]

//! Spendify: an expense tracker with per-period spending charts, a monthly
//! budget, lend/borrow records and an offline expense queue, driven from a
//! scriptable shell.

pub mod cli;
pub mod core;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Spendify tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
