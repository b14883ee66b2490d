use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ModelError;

/// Up to eight integer digits and at most two fractional digits.
static PRICE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,8})(?:\.([0-9]{0,2}))?$").expect("static price pattern")
});

/// Non-negative price held exactly as whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(u64);

impl Price {
    pub const fn from_cents(cents: u64) -> Self {
        Price(cents)
    }

    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Value as a float for JSON payloads. Cents fit well inside the f64
    /// mantissa for every price the text form can express.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Round a float coming back from the server onto the cent grid.
    pub fn from_f64(value: f64) -> Result<Self, ModelError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ModelError::InvalidPrice(value.to_string()));
        }
        Ok(Price((value * 100.0).round() as u64))
    }
}

impl FromStr for Price {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let captures = PRICE_PATTERN
            .captures(trimmed)
            .ok_or_else(|| ModelError::InvalidPrice(raw.to_string()))?;

        let whole: u64 = captures[1]
            .parse()
            .map_err(|_| ModelError::InvalidPrice(raw.to_string()))?;
        let fraction = captures.get(2).map(|m| m.as_str()).unwrap_or("");
        let fraction_cents: u64 = if fraction.is_empty() {
            0
        } else {
            let digits: u64 = fraction
                .parse()
                .map_err(|_| ModelError::InvalidPrice(raw.to_string()))?;
            if fraction.len() == 1 { digits * 10 } else { digits }
        };

        Ok(Price(whole * 100 + fraction_cents))
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::Price;
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

    impl Serialize for Price {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_f64(self.as_f64())
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPrice {
        Whole(u64),
        Float(f64),
        Text(String),
    }

    impl<'de> Deserialize<'de> for Price {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            match RawPrice::deserialize(deserializer)? {
                RawPrice::Whole(units) => units
                    .checked_mul(100)
                    .map(Price::from_cents)
                    .ok_or_else(|| de::Error::custom("price out of range")),
                RawPrice::Float(value) => Price::from_f64(value).map_err(de::Error::custom),
                RawPrice::Text(text) => text.parse().map_err(de::Error::custom),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_fraction_digits() {
        let price: Price = "42.50".parse().unwrap();
        assert_eq!(price.cents(), 4250);
        assert_eq!(price.to_string(), "42.50");
    }

    #[test]
    fn pads_single_fraction_digit_and_bare_point() {
        assert_eq!("3.5".parse::<Price>().unwrap().cents(), 350);
        assert_eq!("3.".parse::<Price>().unwrap().cents(), 300);
        assert_eq!("0".parse::<Price>().unwrap().cents(), 0);
    }

    #[test]
    fn rejects_malformed_prices() {
        for raw in [
            "abc",
            "",
            "-1",
            "1.234",
            "123456789",
            "1,5",
            ".5",
            "1.\u{0665}",
            "1.\u{0665}\u{0665}",
            "\u{0661}2",
        ] {
            assert!(
                matches!(raw.parse::<Price>(), Err(ModelError::InvalidPrice(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn float_round_trip_lands_on_cent_grid() {
        let price = Price::from_f64(19.99).unwrap();
        assert_eq!(price.cents(), 1999);
        assert!(Price::from_f64(-0.01).is_err());
        assert!(Price::from_f64(f64::NAN).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_numbers_and_strings() {
        let from_float: Price = serde_json::from_str("42.5").unwrap();
        let from_int: Price = serde_json::from_str("7").unwrap();
        let from_text: Price = serde_json::from_str("\"1.25\"").unwrap();
        assert_eq!(from_float.cents(), 4250);
        assert_eq!(from_int.cents(), 700);
        assert_eq!(from_text.cents(), 125);
        assert_eq!(serde_json::to_string(&from_float).unwrap(), "42.5");
    }
}
