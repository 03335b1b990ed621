//! Deterministic fallback images.
//!
//! The prompt itself, percent-encoded, is the seed: the same prompt always
//! maps to the same picture.

/// Edge length in pixels of the square placeholder.
pub const PLACEHOLDER_SIZE: u32 = 500;

/// Placeholder image URL for `prompt` on the service at `base_url`.
pub fn placeholder_url(base_url: &str, prompt: &str) -> String {
    format!(
        "{}/seed/{}/{}/{}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(prompt),
        PLACEHOLDER_SIZE,
        PLACEHOLDER_SIZE
    )
}
