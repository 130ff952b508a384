//! Configuration loaded from `.enpassvault.toml`.

pub mod settings;

pub use settings::Settings;
