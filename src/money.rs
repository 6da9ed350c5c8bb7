//! Monetary values stay `BigDecimal` between the store and the service;
//! JSON carries them as plain numbers.

use bigdecimal::{BigDecimal, ToPrimitive};

/// Serde adapter: `#[serde(with = "crate::money::as_json_number")]`.
pub mod as_json_number {
    use bigdecimal::{BigDecimal, ToPrimitive};
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::str::FromStr;

    pub fn serialize<S>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.to_f64().unwrap_or(0.0))
    }

    // Round-trips through the number's decimal text so 100.5 parses as
    // exactly 100.5, not its nearest binary float.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
    where
        D: Deserializer<'de>,
    {
        let number = serde_json::Number::deserialize(deserializer)?;
        BigDecimal::from_str(&number.to_string())
            .map_err(|_| de::Error::custom("amount must be a decimal number"))
    }
}

pub fn to_f64(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// Two decimal places, the precision used for percentages.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::str::FromStr;

    #[derive(Debug, Serialize, Deserialize)]
    struct Payload {
        #[serde(with = "as_json_number")]
        amount: BigDecimal,
    }

    #[test]
    fn serializes_as_plain_number() {
        let payload = Payload {
            amount: BigDecimal::from_str("100.50").unwrap(),
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["amount"], 100.5);
    }

    #[test]
    fn deserializes_decimal_text_exactly() {
        let payload: Payload = serde_json::from_str(r#"{"amount": 100.5}"#).unwrap();
        assert_eq!(payload.amount, BigDecimal::from_str("100.5").unwrap());
    }

    #[test]
    fn rejects_non_numeric_amounts() {
        let parsed = serde_json::from_str::<Payload>(r#"{"amount": "a lot"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
        assert_eq!(round2(25.0), 25.0);
    }

    #[test]
    fn zero_decimal_maps_to_zero_float() {
        assert_eq!(to_f64(&BigDecimal::from(0)), 0.0);
    }
}
