//! Share module: single-use tokens and the links that carry them.
//!
//! This module provides:
//! - `ShareToken` records, token generation and the TTL policy (`token`)
//! - Redemption URL building and QR rendering (`link`)

pub mod link;
pub mod token;

pub use link::{render_qr, share_url, token_from_input};
pub use token::{generate_token, IssuedToken, ShareToken, TOKEN_BYTES, TOKEN_TTL_SECONDS};
