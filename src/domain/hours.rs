//! Worked hours backed by rust_decimal.
//!
//! Stored as two-decimal text; aggregated as whole hundredths so sums never
//! pick up floating-point drift.

use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Hours worked, always carried at two decimal places.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hours(Decimal);

impl Hours {
    const SCALE: u32 = 2;

    /// Build from a count of hundredths of an hour (`750` is 7.50 hours).
    pub fn from_hundredths(hundredths: i64) -> Self {
        Hours(Decimal::new(hundredths, Self::SCALE))
    }

    /// Parse hours from a string such as `"7.5"` or `"8.00"`.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn parse(s: &str) -> Result<Self, rust_decimal::Error> {
        Decimal::from_str(s).map(|d| Hours(d.round_dp(Self::SCALE)))
    }

    /// Text form stored in the `hours_worked` column, e.g. `"7.50"`.
    pub fn to_canonical_string(&self) -> String {
        let mut value = self.0;
        value.rescale(Self::SCALE);
        value.to_string()
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_two_places() {
        assert_eq!(Hours::from_hundredths(1550).to_string(), "15.50");
        assert_eq!(Hours::from_hundredths(800).to_string(), "8.00");
        assert_eq!(Hours::parse("7.5").unwrap().to_string(), "7.50");
        assert_eq!(Hours::parse("9").unwrap().to_string(), "9.00");
    }

    #[test]
    fn test_parse_matches_hundredths() {
        assert_eq!(Hours::parse("7.50").unwrap(), Hours::from_hundredths(750));
        assert_eq!(
            Hours::parse(&Hours::from_hundredths(800).to_canonical_string()).unwrap(),
            Hours::from_hundredths(800)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Hours::parse("eight").is_err());
    }
}
