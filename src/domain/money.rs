use thiserror::Error;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// 1 unit = 100 cents, so 699.00 = 69900 cents.
pub type Cents = i64;

/// Largest amount a single entry may carry: 10 trillion units.
/// Over 9000 entries of this size still sum inside `i64`.
pub const MAX_ENTRY_CENTS: Cents = 1_000_000_000_000_000;

/// Longest digit run accepted in a decimal literal. Keeps the scaled
/// arithmetic below inside `i128`.
const MAX_DIGITS: usize = 30;

/// Format cents as a human-readable amount.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Convert a stored floating-point amount into cents, rounding to the nearest cent.
pub fn cents_from_f64(value: f64) -> Option<Cents> {
    if !value.is_finite() {
        return None;
    }
    let scaled = (value * 100.0).round();
    if scaled.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(scaled as Cents)
}

/// Convert cents into the floating-point form used by the JSON store.
pub fn cents_to_f64(cents: Cents) -> f64 {
    cents as f64 / 100.0
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("not a decimal number")]
    Invalid,
    #[error("number is too large")]
    Overflow,
}

/// An exact decimal literal: `mantissa / 10^scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    /// Parse a decimal literal. Either `.` or `,` is accepted as the separator.
    /// Example: "249,5" -> 249.5, "-5" -> -5, ".50" -> 0.5
    pub fn parse(input: &str) -> Result<Self, DecimalError> {
        let normalized = input.trim().replace(',', ".");
        let (negative, body) = match normalized.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, normalized.strip_prefix('+').unwrap_or(&normalized)),
        };

        let (int_part, frac_part) = match body.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (body, ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(DecimalError::Invalid);
        }
        if !all_digits(int_part) || !all_digits(frac_part) {
            return Err(DecimalError::Invalid);
        }

        let significant = int_part.trim_start_matches('0').len() + frac_part.len();
        if significant > MAX_DIGITS {
            return Err(DecimalError::Overflow);
        }

        let mut mantissa: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa * 10 + i128::from(b - b'0');
        }

        Ok(Self {
            mantissa: if negative { -mantissa } else { mantissa },
            scale: frac_part.len() as u32,
        })
    }

    /// Divide by `divisor` and round to whole cents, half away from zero.
    /// The division and rounding happen in one step on the exact value.
    pub fn to_cents_divided(self, divisor: u32) -> Result<Cents, DecimalError> {
        debug_assert!(divisor > 0);
        let numerator = self.mantissa * 100;
        let denominator = 10i128.pow(self.scale) * i128::from(divisor);
        let rounded = round_div(numerator, denominator);
        Cents::try_from(rounded).map_err(|_| DecimalError::Overflow)
    }

    /// Round to whole cents, half away from zero.
    pub fn to_cents(self) -> Result<Cents, DecimalError> {
        self.to_cents_divided(1)
    }
}

fn round_div(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(input: &str) -> Result<Cents, DecimalError> {
        Decimal::parse(input)?.to_cents()
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
        assert_eq!(format_cents(-1), "-0.01");
        assert_eq!(format_cents(7930100), "79301.00");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(cents("50.00"), Ok(5000));
        assert_eq!(cents("50"), Ok(5000));
        assert_eq!(cents("249,00"), Ok(24900));
        assert_eq!(cents("12.5"), Ok(1250));
        assert_eq!(cents(".50"), Ok(50));
        assert_eq!(cents("7."), Ok(700));
        assert_eq!(cents("-5"), Ok(-500));
        assert_eq!(cents("+5"), Ok(500));
    }

    #[test]
    fn test_rounds_half_away_from_zero() {
        assert_eq!(cents("0.005"), Ok(1));
        assert_eq!(cents("0.0049"), Ok(0));
        assert_eq!(cents("100.999"), Ok(10100));
        assert_eq!(cents("-0.005"), Ok(-1));
    }

    #[test]
    fn test_divided_rounding() {
        let annual = Decimal::parse("83988").unwrap();
        assert_eq!(annual.to_cents_divided(12), Ok(699900));

        // 100 / 12 = 8.3333...
        let annual = Decimal::parse("100").unwrap();
        assert_eq!(annual.to_cents_divided(12), Ok(833));

        // 0.06 / 12 = 0.005 exactly, a tie
        let annual = Decimal::parse("0.06").unwrap();
        assert_eq!(annual.to_cents_divided(12), Ok(1));
    }

    #[test]
    fn test_parse_decimal_invalid() {
        assert_eq!(cents("abc"), Err(DecimalError::Invalid));
        assert_eq!(cents("12.34.56"), Err(DecimalError::Invalid));
        assert_eq!(cents("1,234.5"), Err(DecimalError::Invalid));
        assert_eq!(cents(""), Err(DecimalError::Invalid));
        assert_eq!(cents("."), Err(DecimalError::Invalid));
        assert_eq!(cents("1e3"), Err(DecimalError::Invalid));
        assert_eq!(cents("nan"), Err(DecimalError::Invalid));
        assert_eq!(cents("--5"), Err(DecimalError::Invalid));
    }

    #[test]
    fn test_parse_decimal_overflow() {
        assert_eq!(cents("99999999999999999999"), Err(DecimalError::Overflow));
        assert_eq!(
            cents("1234567890123456789012345678901"),
            Err(DecimalError::Overflow)
        );
    }

    #[test]
    fn test_entry_ceiling_fits_many_entries() {
        assert!(MAX_ENTRY_CENTS.checked_mul(9000).is_some());
    }

    #[test]
    fn test_f64_conversion() {
        assert_eq!(cents_from_f64(699.0), Some(69900));
        assert_eq!(cents_from_f64(249.99), Some(24999));
        assert_eq!(cents_from_f64(f64::NAN), None);
        assert_eq!(cents_to_f64(699900), 6999.0);
    }
}
