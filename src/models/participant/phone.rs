//! Phone number normalization. Storage keeps digits only; display and input
//! use the fixed `dddd-dddd` grouping.

pub const PHONE_DIGITS: usize = 8;

pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Input mask applied as the number is typed: digits only, at most eight,
/// hyphen after the fourth.
pub fn format_phone_input(raw: &str) -> String {
    let digits: String = digits_only(raw).chars().take(PHONE_DIGITS).collect();
    if digits.len() > 4 {
        format!("{}-{}", &digits[..4], &digits[4..])
    } else {
        digits
    }
}

/// Parse a submitted number: hyphens and spaces are ignored, the rest must be
/// exactly eight ASCII digits. Returns the digits.
pub fn parse_phone(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();
    (digits.len() == PHONE_DIGITS && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

/// Group a stored eight-digit number for display; anything else is shown as is.
pub fn display(digits: &str) -> String {
    if digits.len() == PHONE_DIGITS && digits.chars().all(|c| c.is_ascii_digit()) {
        format!("{}-{}", &digits[..4], &digits[4..])
    } else {
        digits.to_string()
    }
}
