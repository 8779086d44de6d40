//! Storage key generation.
//!
//! Key format: `uploads/{sanitized base name}_{uuid v4}.{extension}`.
//! Keys are never looked up before writing; uniqueness rests on the random
//! UUID.

use uuid::Uuid;

/// Prefix of every generated key.
pub const KEY_PREFIX: &str = "uploads/";

/// Splits a file name into its base (text before the first `.`) and its
/// extension (text after the last `.`, verbatim). The extension is empty when
/// the name has no dot.
pub fn split_name(raw_name: &str) -> (&str, &str) {
    let base = raw_name.split('.').next().unwrap_or_default();
    let extension = raw_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or_default();
    (base, extension)
}

/// Makes a base name safe for keys and URLs: every character outside
/// `[A-Za-z0-9.-]` becomes `_`, runs of `_` collapse to one, and the result
/// is lower-cased.
///
/// Callers pass the base from [`split_name`]; an extension left in `raw` is
/// kept as is.
pub fn sanitize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
            c.to_ascii_lowercase()
        } else {
            '_'
        };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Generates a fresh storage key for a file submitted as `raw_name`.
pub fn generate_key(raw_name: &str) -> String {
    generate_key_with_token(raw_name, &Uuid::new_v4().to_string())
}

/// Builds a key with an explicit unique token.
pub fn generate_key_with_token(raw_name: &str, token: &str) -> String {
    let (base, extension) = split_name(raw_name);
    let base = sanitize(base);
    if extension.is_empty() {
        format!("{KEY_PREFIX}{base}_{token}")
    } else {
        format!("{KEY_PREFIX}{base}_{token}.{extension}")
    }
}
