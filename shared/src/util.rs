use rand::Rng;

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Session code alphabet (A–Z, 0–9)
pub const SESSION_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Session code length
pub const SESSION_CODE_LEN: usize = 6;

/// Generate a random shareable session code, e.g. `K7Q2ZD`
///
/// Uniqueness among live sessions is enforced by the caller.
pub fn generate_session_code() -> String {
    let mut rng = rand::thread_rng();
    (0..SESSION_CODE_LEN)
        .map(|_| SESSION_CODE_ALPHABET[rng.gen_range(0..SESSION_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Normalize a user-entered session code (trim, uppercase)
pub fn normalize_session_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_code_shape() {
        for _ in 0..100 {
            let code = generate_session_code();
            assert_eq!(code.len(), SESSION_CODE_LEN);
            assert!(code.bytes().all(|b| SESSION_CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_normalize_session_code() {
        assert_eq!(normalize_session_code(" abc123 "), "ABC123");
    }
}
