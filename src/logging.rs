//! Logging bootstrap.
//!
//! The crate logs through the `log` facade; binaries and tests that
//! want output call [`init`] once. `RUST_LOG` selects the filter.

use std::sync::Once;

static INIT: Once = Once::new();

/// Install the env_logger backend. Idempotent; later calls are no-ops.
pub fn init() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .is_test(cfg!(test))
        .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        log::debug!("still here");
    }
}
