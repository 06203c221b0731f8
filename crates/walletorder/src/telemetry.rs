use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "WALLETORDER_LOG";

/// Resolve the logging filter: `WALLETORDER_LOG` wins over `default_filter`.
pub fn resolve_env_filter(default_filter: &str) -> String {
    std::env::var(LOG_ENV).unwrap_or_else(|_| default_filter.to_string())
}

/// Install a stderr fmt subscriber for hosts that do not bring their own.
///
/// Returns `false` when a global subscriber was already set.
pub fn install(default_filter: &str) -> bool {
    let filter = resolve_env_filter(default_filter);

    fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        let _ = install("debug");
        assert!(!install("debug"));
    }
}
