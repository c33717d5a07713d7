use log::LevelFilter;

/// Install the `env_logger` backend. `RUST_LOG` wins when set; otherwise
/// info everywhere and debug for the mdpad crates.
pub fn init() {
    let mut logger = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        logger.filter_level(LevelFilter::Info);
        for module in ["mdpad", "mdsession", "mdcore"] {
            logger.filter_module(module, LevelFilter::Debug);
        }
    }
    if let Err(e) = logger.try_init() {
        log::debug!("Logger already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init();
        log::info!("logger still usable");
    }
}
