//! Logger setup.
//!
//! easel logs through the [`log`] facade. Games that want to see those
//! messages call [`init`] once at startup; `RUST_LOG` overrides the default
//! `info` level as usual for `env_logger`.

/// Install `env_logger` as the global logger.
///
/// Safe to call more than once: if a logger is already installed the call is a
/// no-op apart from a note on stderr.
pub fn init() {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(log::LevelFilter::Info);
    builder.parse_default_env();

    if builder.try_init().is_err() {
        eprintln!("[easel] a logger is already set, keeping it");
    }
}
