//! Redemption links and their scannable rendering.
//!
//! Only the finished URL crosses into this module; it never sees keys
//! or plaintext.

use qrcode::render::unicode;
use qrcode::QrCode;

use crate::errors::{QrVaultError, Result};

/// Build `<public_url>/<redeem_path>/<token>` without doubled slashes.
pub fn share_url(public_url: &str, redeem_path: &str, token: &str) -> String {
    let base = public_url.trim().trim_end_matches('/');
    let path = redeem_path.trim().trim_matches('/');
    if path.is_empty() {
        format!("{base}/{token}")
    } else {
        format!("{base}/{path}/{token}")
    }
}

/// Accept either a bare token or a full share URL and return the token.
///
/// Query strings and fragments after the token are dropped.
pub fn token_from_input(input: &str) -> &str {
    let input = input.trim();
    let without_suffix = input
        .split(&['?', '#'][..])
        .next()
        .unwrap_or(input)
        .trim_end_matches('/');
    match without_suffix.rsplit_once('/') {
        Some((_, token)) => token,
        None => without_suffix,
    }
}

/// Render `url` as a QR code made of unicode half-blocks, ready to print
/// to a terminal.
pub fn render_qr(url: &str) -> Result<String> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| QrVaultError::CommandFailed(format!("QR generation failed: {e}")))?;

    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}
