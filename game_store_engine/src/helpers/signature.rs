use sha2::{Digest, Sha512};

/// Computes the signature a provider attaches to a payment notification:
/// `hex(sha512(order_id + status_code + gross_amount + server_key))`.
pub fn notification_signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks a notification's `signature_key` against the locally computed signature. Hex case is ignored.
pub fn verify_notification_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
    signature_key: &str,
) -> bool {
    let expected = notification_signature(order_id, status_code, gross_amount, server_key);
    constant_time_eq(expected.as_bytes(), signature_key.trim().to_ascii_lowercase().as_bytes())
}

pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
