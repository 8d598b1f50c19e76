use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::{ConsoleError, GENERIC_FAILURE};

/// List endpoints wrap their rows in `{"list": [...]}`; the budget overview
/// uses `details` instead.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new", alias = "details")]
    pub list: Vec<T>,
}

/// Response of create/update/delete/transition endpoints.
///
/// Most endpoints answer `{success, error?}`, a few return the raw entity
/// instead, so every field is optional and unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationOutcome {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
    /// New status reported by transition endpoints (e.g. order validation).
    #[serde(default)]
    pub statut: Option<String>,
}

impl MutationOutcome {
    /// Strict reading: only an explicit `success: true` counts.
    pub fn into_result(self) -> Result<Self, ConsoleError> {
        match (self.success, self.error.as_deref()) {
            (Some(true), _) => Ok(self),
            (_, Some(message)) if !message.is_empty() => {
                Err(ConsoleError::Rejected(message.to_string()))
            }
            _ => Err(ConsoleError::Rejected(GENERIC_FAILURE.to_string())),
        }
    }

    /// Lenient reading for endpoints that return the entity itself: anything
    /// without an explicit failure or error message counts as success.
    pub fn into_lenient_result(self) -> Result<Self, ConsoleError> {
        match (self.success, self.error.as_deref()) {
            (Some(false), None) => Err(ConsoleError::Rejected(GENERIC_FAILURE.to_string())),
            (_, Some(message)) if !message.is_empty() => {
                Err(ConsoleError::Rejected(message.to_string()))
            }
            _ => Ok(self),
        }
    }
}

/// Row counters keyed by status plus a `_total` bucket.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq)]
pub struct StatBucket {
    #[serde(default)]
    pub count: u64,
    #[serde(default, deserialize_with = "de_amount")]
    pub total: Option<f64>,
}

// The backend serializes decimals inconsistently (number, string, or null).
pub(crate) fn de_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct AmountVisitor;

    impl<'de> de::Visitor<'de> for AmountVisitor {
        type Value = Option<f64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a number, a numeric string or null")
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v as f64))
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            Ok(trimmed.replace(',', ".").parse::<f64>().ok())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(AmountVisitor)
}

// Foreign keys sometimes arrive as strings; empty strings mean "none".
pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> de::Visitor<'de> for IdVisitor {
        type Value = Option<i64>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("an integer id, a numeric string or null")
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(v).map(Some).map_err(E::custom)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            Ok(v.trim().parse::<i64>().ok())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

// Years and codes come back as numbers or strings depending on the column type.
pub(crate) fn de_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrNumberVisitor;

    impl<'de> de::Visitor<'de> for StringOrNumberVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            if v.is_empty() {
                Ok(None)
            } else {
                Ok(Some(v.to_string()))
            }
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(StringOrNumberVisitor)
}

// "True"/"False", 0/1 and real booleans all occur in the payloads.
pub(crate) fn de_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl<'de> de::Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a boolean, 0/1, or 'true'/'false'")
        }

        fn visit_bool<E>(self, v: bool) -> Result<Self::Value, E> {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E> {
            Ok(v != 0)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v != 0)
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E> {
            Ok(matches!(v.to_lowercase().as_str(), "true" | "1" | "oui"))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(false)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}
