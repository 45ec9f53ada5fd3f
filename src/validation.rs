//! Field validation
//!
//! Format checks shared by the login form, the profile address editor, checkout and the
//! payment simulator. Every check is a plain predicate; callers decide which message to show.

use std::sync::LazyLock;

use regex::Regex;

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\w.-]+@[\w-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern compiles"));

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static POSTAL_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5,6}$").expect("postal code pattern compiles"));

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static CARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{16}$").expect("card number pattern compiles"));

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static EXPIRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("expiry pattern compiles")
});

#[expect(clippy::expect_used, reason = "pattern is a compile-time constant")]
static CVV: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("cvv pattern compiles"));

/// Minimum password length accepted by the login form.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Whether `value` has at least one non-whitespace character.
pub fn is_present(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Whether `value` contains an ASCII digit.
pub fn contains_digit(value: &str) -> bool {
    value.chars().any(|c| c.is_ascii_digit())
}

/// Whether `value` looks like an email address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Whether `value` is exactly 10 digits.
pub fn is_valid_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

/// Whether `value` is a 5 or 6 digit postal code.
pub fn is_valid_postal_code(value: &str) -> bool {
    POSTAL_CODE.is_match(value)
}

/// Whether `value` is a 16 digit card number once whitespace is removed.
pub fn is_valid_card_number(value: &str) -> bool {
    CARD_NUMBER.is_match(&strip_whitespace(value))
}

/// Whether `value` is an `MM/YY` expiry with a month between 01 and 12.
pub fn is_valid_expiry(value: &str) -> bool {
    EXPIRY.is_match(value)
}

/// Whether `value` is a 3 or 4 digit security code.
pub fn is_valid_cvv(value: &str) -> bool {
    CVV.is_match(value)
}

/// Whether `value` is a non-blank UPI handle containing `@`.
pub fn is_valid_upi_id(value: &str) -> bool {
    is_present(value) && value.contains('@')
}

/// Whether `value` is long enough to be a password.
pub fn is_valid_password(value: &str) -> bool {
    value.chars().count() >= MIN_PASSWORD_LEN
}

/// `value` with every whitespace character removed.
pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Format raw card input as space-separated groups of four digits, keeping at most 16 digits.
pub fn format_card_number(value: &str) -> String {
    let digits: Vec<char> = value
        .chars()
        .filter(char::is_ascii_digit)
        .take(16)
        .collect();

    digits
        .chunks(4)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Format raw expiry input as `MM/YY`, inserting the slash after the month.
pub fn format_expiry(value: &str) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).take(4).collect();

    match digits.split_at_checked(2) {
        Some((month, year)) if !year.is_empty() => format!("{month}/{year}"),
        _ => digits,
    }
}
