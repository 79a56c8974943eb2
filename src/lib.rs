pub mod cli;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod identity;
pub mod logging;
pub mod share;
pub mod store;
pub mod vault;
