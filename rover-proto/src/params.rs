//! Numeric parameter tokenizer.
//!
//! Scans a comma-separated list of floating-point values the way `strtod`
//! would, one token at a time:
//!
//! ```text
//! <ws>* <number> <ws>* [',' ...]
//! ```
//!
//! A token that is followed by anything other than a comma or the end of the
//! input ends the scan early. That is not an error: the caller receives the
//! tokens parsed so far and decides whether the count is acceptable.

/// Whitespace as understood by C `isspace` (includes vertical tab).
#[inline]
pub(crate) const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Trim leading whitespace.
#[inline]
pub(crate) fn skip_space(s: &[u8]) -> &[u8] {
    let start = s.iter().position(|&b| !is_space(b)).unwrap_or(s.len());
    &s[start..]
}

/// Count ASCII digits at the start of `s`.
#[inline]
fn digit_run(s: &[u8]) -> usize {
    s.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Length of the longest prefix of `s` that forms a decimal floating-point number.
///
/// Accepts an optional sign, digits with an optional fractional part (at
/// least one digit overall), and an optional exponent that is only consumed
/// when it carries at least one digit. Returns 0 if there is no numeric prefix.
fn numeric_prefix_len(s: &[u8]) -> usize {
    let mut pos = match s.first() {
        Some(b'+' | b'-') => 1,
        _ => 0,
    };

    let int_digits = digit_run(&s[pos..]);
    pos += int_digits;

    let mut frac_digits = 0;
    if s.get(pos) == Some(&b'.') {
        frac_digits = digit_run(&s[pos + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            pos += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    if matches!(s.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(s.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_digits = digit_run(&s[exp..]);
        if exp_digits > 0 {
            pos = exp + exp_digits;
        }
    }

    pos
}

/// Parse the longest numeric prefix of `s`.
///
/// Returns the value and the number of bytes consumed, or `None` if `s`
/// does not start with a number. Leading whitespace is not skipped.
///
/// ```
/// use rover_proto::params::parse_number;
///
/// assert_eq!(parse_number(b"-12.5,3"), Some((-12.5, 5)));
/// assert_eq!(parse_number(b"abc"), None);
/// ```
#[must_use]
pub fn parse_number(s: &[u8]) -> Option<(f64, usize)> {
    let len = numeric_prefix_len(s);
    if len == 0 {
        return None;
    }

    // The prefix is pure ASCII, so the UTF-8 check cannot fail
    let text = core::str::from_utf8(&s[..len]).ok()?;
    let value = text.parse::<f64>().ok()?;
    Some((value, len))
}

/// Tokenize up to `out.len()` comma-separated numbers from `input`.
///
/// Returns how many values were written to the front of `out`.
///
/// ```
/// use rover_proto::params::parse_params;
///
/// let mut out = [0.0; 4];
/// assert_eq!(parse_params(b" 255, -255", &mut out), 2);
/// assert_eq!(&out[..2], &[255.0, -255.0]);
///
/// // An unexpected character stops the scan but keeps earlier tokens
/// assert_eq!(parse_params(b"1;2", &mut out), 1);
/// ```
pub fn parse_params(input: &[u8], out: &mut [f64]) -> usize {
    let mut count = 0;
    let mut rest = input;

    while count < out.len() {
        rest = skip_space(rest);
        if rest.is_empty() {
            break;
        }

        let Some((value, used)) = parse_number(rest) else {
            break;
        };
        out[count] = value;
        count += 1;

        rest = skip_space(&rest[used..]);
        match rest.first() {
            Some(b',') => rest = &rest[1..],
            // End of input or an unexpected character
            _ => break,
        }
    }

    count
}
