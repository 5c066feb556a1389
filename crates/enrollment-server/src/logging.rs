//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::EnvFilter;

use enrollment_core::Settings;

/// Default filter when `RUST_LOG` is unset
pub fn default_directive(settings: &Settings) -> &'static str {
    if settings.debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the profile's debug flag.
pub fn init(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(settings)));

    if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("Logging already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use enrollment_core::Profile;

    use super::*;

    #[test]
    fn test_default_directive_follows_debug_flag() {
        assert_eq!(default_directive(&Settings::for_profile(Profile::Development)), "debug");
        assert_eq!(default_directive(&Settings::for_profile(Profile::Production)), "info");
    }
}
