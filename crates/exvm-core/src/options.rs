//! Engine option declarations and value parsing.

use std::num::IntErrorKind;

use exvm_common::OptionError;

/// A declared engine option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Option name as passed to `set_option`.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
}

/// Why an integer option value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerError {
    /// Not a well-formed integer.
    Invalid,
    /// Well-formed but outside the target type's range.
    OutOfRange,
}

/// Parse an integer, detecting the radix from its prefix.
///
/// Accepts surrounding whitespace, an optional sign, then `0x`/`0X` for hex,
/// a leading `0` for octal, or plain decimal. The whole string must be
/// consumed.
pub fn parse_integer(text: &str) -> Result<i128, IntegerError> {
    let trimmed = text.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let (radix, digits) = if let Some(hex) = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
    {
        (16, hex)
    } else if unsigned.len() > 1 && unsigned.starts_with('0') {
        (8, &unsigned[1..])
    } else {
        (10, unsigned)
    };

    // from_str_radix accepts its own sign; digits must be bare.
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(IntegerError::Invalid);
    }

    let magnitude = u128::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => IntegerError::OutOfRange,
        _ => IntegerError::Invalid,
    })?;
    let magnitude = i128::try_from(magnitude).map_err(|_| IntegerError::OutOfRange)?;

    Ok(if negative { -magnitude } else { magnitude })
}

/// Parse a value for the 32-bit signed integer option `name`.
pub fn parse_i32_option(name: &str, value: &str) -> Result<i32, OptionError> {
    let wide = parse_integer(value).map_err(|e| match e {
        IntegerError::Invalid => OptionError::invalid_value(name, value),
        IntegerError::OutOfRange => OptionError::out_of_range(name, value),
    })?;
    i32::try_from(wide).map_err(|_| OptionError::out_of_range(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal() {
        assert_eq!(parse_integer("42"), Ok(42));
        assert_eq!(parse_integer("-42"), Ok(-42));
        assert_eq!(parse_integer("+7"), Ok(7));
        assert_eq!(parse_integer("0"), Ok(0));
        assert_eq!(parse_integer("  12 "), Ok(12));
    }

    #[test]
    fn test_hex_and_octal() {
        assert_eq!(parse_integer("0x2a"), Ok(42));
        assert_eq!(parse_integer("0X2A"), Ok(42));
        assert_eq!(parse_integer("-0x10"), Ok(-16));
        assert_eq!(parse_integer("052"), Ok(42));
    }

    #[test]
    fn test_invalid() {
        for text in ["", "x", "0x", "-", "12abc", "08", "4 2", "--1", "0x-1"] {
            assert_eq!(parse_integer(text), Err(IntegerError::Invalid), "{text:?}");
        }
    }

    #[test]
    fn test_overflow() {
        let huge = "9".repeat(60);
        assert_eq!(parse_integer(&huge), Err(IntegerError::OutOfRange));
    }

    #[test]
    fn test_i32_option_bounds() {
        assert_eq!(parse_i32_option("opt", "2147483647"), Ok(i32::MAX));
        assert_eq!(parse_i32_option("opt", "-2147483648"), Ok(i32::MIN));

        assert_eq!(
            parse_i32_option("opt", "2147483648"),
            Err(OptionError::out_of_range("opt", "2147483648"))
        );
        assert_eq!(
            parse_i32_option("opt", "-2147483649"),
            Err(OptionError::out_of_range("opt", "-2147483649"))
        );
        assert_eq!(
            parse_i32_option("opt", "x"),
            Err(OptionError::invalid_value("opt", "x"))
        );
    }
}
