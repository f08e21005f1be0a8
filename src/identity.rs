use sha2::{Digest, Sha256};

/// Hex characters kept from the digest.
pub const HASH_LEN: usize = 40;

/// Content hash of a component: SHA-256 over the declared name, a NUL
/// separator and the component's exact source bytes, truncated to
/// [`HASH_LEN`] hex characters.
pub fn compute_hash(name: &str, source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update([0u8]);
    hasher.update(source.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..HASH_LEN].to_string()
}

/// Lowercased name restricted to `[a-z0-9_]`, never starting with a digit,
/// so that it is both a module stem and a script identifier.
fn identifier_stem(name: &str) -> String {
    let mut stem: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        stem = "component".to_string();
    } else if stem.starts_with(|c: char| c.is_ascii_digit()) {
        stem.insert(0, '_');
    }
    stem
}

/// `<lowercased name>_<hash>`; also the stem of the generated module file.
/// The hash covers the name as declared.
pub fn component_identifier(name: &str, source: &str) -> String {
    format!("{}_{}", identifier_stem(name), compute_hash(name, source))
}
