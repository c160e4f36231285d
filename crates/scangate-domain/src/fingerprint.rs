use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a violation.
///
/// Identity fields:
/// - rule_id
/// - code
/// - subject (path or purl)
/// - value key (license, or vulnerability id)
pub fn fingerprint_for_violation(rule_id: &str, code: &str, subject: &str, value: &str) -> String {
    let canonical = [rule_id, code, subject, value].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}
