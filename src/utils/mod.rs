/// Injectable wall clock.
pub mod clock;
/// Tracing subscriber setup.
pub mod logging;
/// TOML-based configuration (house.toml).
pub mod toml_config;
