//! ISBN-10 and ISBN-13 checksum validation.

/// Checks an ISBN-10 or ISBN-13 for a valid checksum.
///
/// Hyphens, spaces, and any other non-digit characters (other than a
/// trailing `X`) are stripped before checking.
#[must_use]
pub fn is_valid_isbn(isbn: &str) -> bool {
    let cleaned: Vec<char> = isbn
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    match cleaned.len() {
        10 => is_valid_isbn10(&cleaned),
        13 => is_valid_isbn13(&cleaned),
        _ => false,
    }
}

/// Weighted sum with weights 10..2 over the first nine digits; the check
/// character contributes 10 for `X` or its digit value; valid iff the
/// total is divisible by 11.
fn is_valid_isbn10(chars: &[char]) -> bool {
    let mut sum: u32 = 0;
    for (i, c) in chars[..9].iter().enumerate() {
        let Some(digit) = c.to_digit(10) else {
            return false;
        };
        sum += digit * (10 - i as u32);
    }
    let check = match chars[9] {
        'X' => 10,
        c => match c.to_digit(10) {
            Some(d) => d,
            None => return false,
        },
    };
    (sum + check) % 11 == 0
}

/// Alternating 1/3 weights over the first twelve digits; valid iff
/// `(10 - sum mod 10) mod 10` equals the final digit.
fn is_valid_isbn13(chars: &[char]) -> bool {
    let mut sum: u32 = 0;
    for (i, c) in chars[..12].iter().enumerate() {
        let Some(digit) = c.to_digit(10) else {
            return false;
        };
        sum += digit * if i % 2 == 0 { 1 } else { 3 };
    }
    let Some(check) = chars[12].to_digit(10) else {
        return false;
    };
    (10 - sum % 10) % 10 == check
}
