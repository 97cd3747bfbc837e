// 🔢 Text Normalization - free-form input → digits → integers
//
// Every function here is total: any text is accepted, characters that are
// not ASCII digits are dropped, and anything that cannot be read as a number
// counts as zero.

/// Grouping separator used for display
pub const SEPARATOR: char = ',';

/// Keep only the decimal digits of `text`, in order.
///
/// ```
/// use cash_checker::normalize_digits;
///
/// assert_eq!(normalize_digits("1,234 EGP"), "1234");
/// assert_eq!(normalize_digits("abc"), "");
/// ```
pub fn normalize_digits(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Insert a separator every three digits from the right.
///
/// Input is normalized first, so already-formatted text can be fed back in
/// while the user is typing. Leading zeros are kept as typed.
///
/// ```
/// use cash_checker::format_with_separators;
///
/// assert_eq!(format_with_separators("1234567"), "1,234,567");
/// assert_eq!(format_with_separators("1,2345"), "12,345");
/// assert_eq!(format_with_separators(""), "");
/// ```
pub fn format_with_separators(digits: &str) -> String {
    let digits = normalize_digits(digits);
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(SEPARATOR);
        }
        out.push(c);
    }

    out
}

/// Parse a digit string as a non-negative integer.
///
/// Empty input, input without digits, and values too large for `u64` all
/// read as 0.
pub fn to_integer(digits: &str) -> u64 {
    normalize_digits(digits).parse().unwrap_or(0)
}

/// Format an integer for display (e.g. the difference in a result banner).
pub fn format_amount(value: u128) -> String {
    format_with_separators(&value.to_string())
}

// ============================================================================
// TESTS
// ============================================================================
