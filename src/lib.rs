#![doc(test(attr(deny(warnings))))]

//! Hearth ties the budget-period engine, configuration and JSON storage together
//! behind a small command-line front end.

pub mod cli;
pub mod errors;
pub mod utils;

/// Installs the tracing subscriber; later calls are no-ops.
pub fn init() {
    utils::init_tracing();
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
