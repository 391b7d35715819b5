//! Cent amounts to and from dollar strings.

/// Formats `cents` as dollars. Whole-dollar amounts drop the decimals unless
/// `show_cents` is set: `1200 -> "12"`, `1250 -> "12.50"`.
pub fn cents_in_dollar_string(cents: i64, show_cents: bool) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    let (dollars, rem) = (abs / 100, abs % 100);
    if rem == 0 && !show_cents {
        format!("{sign}{dollars}")
    } else {
        format!("{sign}{dollars}.{rem:02}")
    }
}

/// Converts user input in whole dollars to cents. Only the leading integer is
/// read (`"12.99"` is 12 dollars); input without one counts as zero.
pub fn dollars_to_cents(input: &str) -> i64 {
    let trimmed = input.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|dollars| sign * dollars.saturating_mul(100))
        .unwrap_or(0)
}
