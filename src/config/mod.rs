//! Configuration: project settings loaded from `.qrvault.toml`.

pub mod settings;

pub use settings::{Settings, PUBLIC_URL_ENV};
