pub const IDENTIFIER_LEN: usize = 10;

/// Student and teacher identifiers are exactly ten ASCII digits.
pub fn is_valid_identifier(s: &str) -> bool {
    s.len() == IDENTIFIER_LEN && s.bytes().all(|b| b.is_ascii_digit())
}
