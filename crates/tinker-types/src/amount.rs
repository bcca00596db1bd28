use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Number of fractional digits carried by [`Shares`].
pub const SHARE_DECIMALS: usize = 18;

/// Staked token units per unit of consensus voting power.
pub const POWER_TO_TOKENS: u64 = 1_000_000;

const SHARE_SCALE: u64 = 1_000_000_000_000_000_000;

const JSON_NUMBER_TOKEN: &str = "$serde_json::private::Number";

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Exact signed token amount.
///
/// Genesis files store every integer amount as a decimal string, and totals
/// routinely exceed 64 bits once denominations are in micro-units, so all
/// arithmetic goes through [`BigInt`].
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigInt);

impl Amount {
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    /// Parse a plain decimal integer, optionally prefixed with `-`.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let digits = s.strip_prefix('-').unwrap_or(s);
        if !is_digits(digits) {
            return Err(TypeError::InvalidAmount(s.to_string()));
        }
        BigInt::from_str(s)
            .map(Self)
            .map_err(|_| TypeError::InvalidAmount(s.to_string()))
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Voting power represented by this many staked tokens (truncating).
    pub fn to_power(&self) -> Amount {
        Self(&self.0 / BigInt::from(POWER_TO_TOKENS))
    }

    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<i64> for Amount {
    fn from(v: i64) -> Self {
        Self(BigInt::from(v))
    }
}

impl From<u64> for Amount {
    fn from(v: u64) -> Self {
        Self(BigInt::from(v))
    }
}

impl From<BigInt> for Amount {
    fn from(v: BigInt) -> Self {
        Self(v)
    }
}

impl Add for Amount {
    type Output = Amount;
    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl<'a> Add<&'a Amount> for &'a Amount {
    type Output = Amount;
    fn add(self, rhs: &'a Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;
    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl<'a> Sub<&'a Amount> for &'a Amount {
    type Output = Amount;
    fn sub(self, rhs: &'a Amount) -> Amount {
        Amount(&self.0 - &rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;
    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Neg for &Amount {
    type Output = Amount;
    fn neg(self) -> Amount {
        Amount(-&self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl<'de> Visitor<'de> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or a decimal integer string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                Ok(Amount::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount::from(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                Amount::parse(v).map_err(E::custom)
            }

            // serde_json with `arbitrary_precision` hands numbers over as a
            // single-entry map keyed by its private number token.
            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Amount, A::Error> {
                match map.next_key::<String>()? {
                    Some(key) if key == JSON_NUMBER_TOKEN => {
                        let text: String = map.next_value()?;
                        Amount::parse(&text).map_err(de::Error::custom)
                    }
                    _ => Err(de::Error::invalid_type(de::Unexpected::Map, &self)),
                }
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Exact fixed-point decimal with [`SHARE_DECIMALS`] fractional digits.
///
/// Stored as an integer count of 10^-18 units. Rendering always emits all 18
/// fractional digits and never uses exponent notation, because the output is
/// hashed and compared byte for byte.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Shares(BigInt);

impl Shares {
    pub fn zero() -> Self {
        Self(BigInt::zero())
    }

    /// Parse `"12"`, `"12.5"` or `"12.500000000000000000"`.
    ///
    /// More than 18 fractional digits is rejected rather than rounded.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let invalid = || TypeError::InvalidShares(s.to_string());
        let (negative, unsigned) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (unsigned, None),
        };
        if !is_digits(int_part) {
            return Err(invalid());
        }
        let mut scaled = BigInt::from_str(int_part).map_err(|_| invalid())? * BigInt::from(SHARE_SCALE);
        if let Some(frac) = frac_part {
            if !is_digits(frac) || frac.len() > SHARE_DECIMALS {
                return Err(invalid());
            }
            let padded = format!("{frac:0<width$}", width = SHARE_DECIMALS);
            scaled += BigInt::from_str(&padded).map_err(|_| invalid())?;
        }
        Ok(Self(if negative { -scaled } else { scaled }))
    }

    /// Whole-token amount as shares (1 token = 1 share).
    pub fn from_amount(amount: &Amount) -> Self {
        Self(amount.as_bigint() * BigInt::from(SHARE_SCALE))
    }

    /// Add a whole-token amount.
    pub fn add_amount(&self, amount: &Amount) -> Self {
        Self(&self.0 + Self::from_amount(amount).0)
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }
}

impl fmt::Display for Shares {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scale = BigInt::from(SHARE_SCALE);
        let abs = self.0.abs();
        let whole = &abs / &scale;
        let frac = (&abs % &scale).to_string();
        let sign = if self.0.is_negative() { "-" } else { "" };
        write!(f, "{sign}{whole}.{frac:0>width$}", width = SHARE_DECIMALS)
    }
}

impl FromStr for Shares {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Add for Shares {
    type Output = Shares;
    fn add(self, rhs: Shares) -> Shares {
        Shares(self.0 + rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn amount_parses_plain_integers() {
        assert_eq!(Amount::parse("0").unwrap(), Amount::zero());
        assert_eq!(Amount::parse("-42").unwrap(), Amount::from(-42i64));
        assert_eq!(
            Amount::parse("550000000000000").unwrap().to_string(),
            "550000000000000"
        );
    }

    #[test]
    fn amount_rejects_non_integers() {
        for bad in ["", "-", "+5", "1.5", "1e6", " 7", "1_000", "abc"] {
            assert!(Amount::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn amount_exceeds_u64() {
        let big = Amount::parse("18446744073709551616").unwrap();
        let sum = &big + &Amount::from(1u64);
        assert_eq!(sum.to_string(), "18446744073709551617");
    }

    #[test]
    fn power_truncates() {
        assert_eq!(Amount::from(1_000_000u64).to_power(), Amount::from(1u64));
        assert_eq!(Amount::from(2_999_999u64).to_power(), Amount::from(2u64));
        assert_eq!(Amount::from(999_999u64).to_power(), Amount::zero());
    }

    #[test]
    fn amount_deserializes_from_string_or_integer() {
        #[derive(serde::Deserialize)]
        struct Row {
            a: Amount,
            b: Amount,
        }
        let row: Row = toml::from_str("a = 300000000\nb = \"-5\"").unwrap();
        assert_eq!(row.a, Amount::from(300_000_000u64));
        assert_eq!(row.b, Amount::from(-5i64));
    }

    #[test]
    fn amount_deserializes_from_json_numbers() {
        let n: Amount = serde_json::from_str("300000000").unwrap();
        assert_eq!(n, Amount::from(300_000_000u64));
        let n: Amount = serde_json::from_str("-7").unwrap();
        assert_eq!(n, Amount::from(-7i64));
        let big: Amount = serde_json::from_str("123456789012345678901234567890").unwrap();
        assert_eq!(big.to_string(), "123456789012345678901234567890");
        let quoted: Amount = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(quoted, Amount::from(42u64));
    }

    #[test]
    fn amount_rejects_fractional_json_numbers_and_objects() {
        assert!(serde_json::from_str::<Amount>("1.5").is_err());
        assert!(serde_json::from_str::<Amount>("{\"amount\": \"5\"}").is_err());
    }

    #[test]
    fn amount_serializes_as_string() {
        let json = serde_json::to_string(&Amount::from(12u64)).unwrap();
        assert_eq!(json, "\"12\"");
    }

    #[test]
    fn shares_render_eighteen_digits() {
        assert_eq!(Shares::parse("0").unwrap().to_string(), "0.000000000000000000");
        assert_eq!(Shares::parse("12.5").unwrap().to_string(), "12.500000000000000000");
        assert_eq!(
            Shares::parse("1000000.000000000000000001").unwrap().to_string(),
            "1000000.000000000000000001"
        );
        assert_eq!(Shares::parse("-0.25").unwrap().to_string(), "-0.250000000000000000");
    }

    #[test]
    fn shares_reject_malformed_text() {
        for bad in ["", ".", "1.", ".5", "1.2.3", "1e18", "0.0000000000000000001"] {
            assert!(Shares::parse(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn shares_add_whole_tokens() {
        let s = Shares::parse("250000000.000000000000000000").unwrap();
        let bumped = s.add_amount(&Amount::from(1_000_000u64));
        assert_eq!(bumped.to_string(), "251000000.000000000000000000");
    }

    #[test]
    fn shares_keep_fraction_exactly_for_large_values() {
        // 2^53 + 1 is not representable as f64; fixed-point must not lose it.
        let s = Shares::parse("9007199254740993.123456789012345678").unwrap();
        let bumped = s.add_amount(&Amount::from(1u64));
        assert_eq!(bumped.to_string(), "9007199254740994.123456789012345678");
    }

    proptest! {
        #[test]
        fn shares_display_roundtrips(whole in 0u64..u64::MAX, frac in 0u64..SHARE_SCALE) {
            let text = format!("{whole}.{frac:018}");
            let parsed = Shares::parse(&text).unwrap();
            prop_assert_eq!(parsed.to_string(), text);
        }

        #[test]
        fn amount_addition_matches_i128(a in any::<i64>(), b in any::<i64>()) {
            let sum = &Amount::from(a) + &Amount::from(b);
            prop_assert_eq!(sum.to_string(), (a as i128 + b as i128).to_string());
        }
    }
}
