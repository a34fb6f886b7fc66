//! Masking for credentials that end up near log output

/// Mask a secret for logging: first 4 + `***` + last 4 characters.
///
/// Secrets of 12 characters or fewer are fully masked.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 12 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}***{tail}")
}
