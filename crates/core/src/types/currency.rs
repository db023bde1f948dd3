//! Supported billing currencies.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Returned when a currency code is not in the supported set.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency: {0}")]
pub struct UnknownCurrency(pub String);

/// ISO 4217 currency codes accepted for payments.
///
/// The set is fixed: the major card currencies plus the East and Southern
/// African currencies the service bills in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    ZAR,
    KES,
    UGX,
    TZS,
}

impl Currency {
    /// Every supported currency, in display order.
    pub const ALL: [Self; 7] = [
        Self::USD,
        Self::EUR,
        Self::GBP,
        Self::ZAR,
        Self::KES,
        Self::UGX,
        Self::TZS,
    ];

    /// The upper-case ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::ZAR => "ZAR",
            Self::KES => "KES",
            Self::UGX => "UGX",
            Self::TZS => "TZS",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = UnknownCurrency;

    /// Case-insensitive lookup; surrounding whitespace is not trimmed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCurrency(s.to_owned()))
    }
}

impl TryFrom<String> for Currency {
    type Error = UnknownCurrency;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Currency> for &'static str {
    fn from(currency: Currency) -> Self {
        currency.code()
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Currency {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Currency {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(s.parse()?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Currency {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("ugx".parse::<Currency>().unwrap(), Currency::UGX);
        assert_eq!("Kes".parse::<Currency>().unwrap(), Currency::KES);
        assert_eq!("USD".parse::<Currency>().unwrap(), Currency::USD);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert_eq!(
            "XYZ".parse::<Currency>(),
            Err(UnknownCurrency("XYZ".to_string()))
        );
        assert!("".parse::<Currency>().is_err());
        assert!(" usd".parse::<Currency>().is_err());
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Currency::ZAR).unwrap(), "\"ZAR\"");
        let parsed: Currency = serde_json::from_str("\"tzs\"").unwrap();
        assert_eq!(parsed, Currency::TZS);
    }
}
