//! Serde support for policy types (feature-gated)
//!
//! This module provides `Serialize` and `Deserialize` implementations for
//! [`RetryPolicy`] and [`Jitter`] when the `serde` feature is enabled, so
//! retry configuration can live in config files.
//!
//! Delays serialize as integer milliseconds (`base_delay_ms`,
//! `max_delay_ms`) and jitter as a lowercase string. Fields absent from the
//! input fall back to the policy defaults, so partial configs stay valid.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde::Deserialize;
//! use resurge::RetryPolicy;
//!
//! #[derive(Deserialize)]
//! struct ServiceConfig {
//!     endpoint: String,
//!     retry: RetryPolicy,
//! }
//!
//! let config: ServiceConfig = serde_json::from_str(
//!     r#"{"endpoint":"api.example.com","retry":{"max_retries":5,"base_delay_ms":250}}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.retry.max_retries(), 5);
//! ```

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

use crate::policy::{Jitter, RetryPolicy};

const JITTER_MODES: &[&str] = &["off", "full", "equal", "decorrelated"];

impl Serialize for Jitter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let name = match self {
            Jitter::Off => "off",
            Jitter::Full => "full",
            Jitter::Equal => "equal",
            Jitter::Decorrelated => "decorrelated",
        };
        serializer.serialize_str(name)
    }
}

struct JitterVisitor;

impl Visitor<'_> for JitterVisitor {
    type Value = Jitter;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "one of {:?}", JITTER_MODES)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Jitter, E> {
        match value {
            "off" => Ok(Jitter::Off),
            "full" => Ok(Jitter::Full),
            "equal" => Ok(Jitter::Equal),
            "decorrelated" => Ok(Jitter::Decorrelated),
            other => Err(E::unknown_variant(other, JITTER_MODES)),
        }
    }
}

impl<'de> Deserialize<'de> for Jitter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(JitterVisitor)
    }
}

impl Serialize for RetryPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RetryPolicy", 4)?;
        state.serialize_field("max_retries", &self.max_retries())?;
        state.serialize_field("base_delay_ms", &(self.base_delay().as_millis() as u64))?;
        state.serialize_field("max_delay_ms", &(self.max_delay().as_millis() as u64))?;
        state.serialize_field("jitter", &self.jitter())?;
        state.end()
    }
}

struct PolicyVisitor;

impl<'de> Visitor<'de> for PolicyVisitor {
    type Value = RetryPolicy;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a retry policy with max_retries, base_delay_ms, max_delay_ms, and jitter")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RetryPolicy, A::Error> {
        let mut policy = RetryPolicy::default();

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "max_retries" => policy = policy.with_max_retries(map.next_value()?),
                "base_delay_ms" => {
                    policy = policy.with_base_delay(Duration::from_millis(map.next_value()?));
                }
                "max_delay_ms" => {
                    policy = policy.with_max_delay(Duration::from_millis(map.next_value()?));
                }
                "jitter" => policy = policy.with_jitter(map.next_value()?),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }

        Ok(policy)
    }
}

impl<'de> Deserialize<'de> for RetryPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        const FIELDS: &[&str] = &["max_retries", "base_delay_ms", "max_delay_ms", "jitter"];
        deserializer.deserialize_struct("RetryPolicy", FIELDS, PolicyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct ServiceConfig {
        endpoint: String,
        retry: RetryPolicy,
    }

    #[test]
    fn test_serialize_default_policy() {
        let json = serde_json::to_string(&RetryPolicy::default()).unwrap();
        assert_eq!(
            json,
            r#"{"max_retries":3,"base_delay_ms":1000,"max_delay_ms":10000,"jitter":"off"}"#
        );
    }

    #[test]
    fn test_roundtrip() {
        let original = RetryPolicy::default()
            .with_max_retries(6)
            .with_base_delay(Duration::from_millis(250))
            .with_max_delay(Duration::from_secs(5))
            .with_jitter(Jitter::Full);

        let json = serde_json::to_string(&original).unwrap();
        let restored: RetryPolicy = serde_json::from_str(&json).unwrap();

        assert_eq!(original, restored);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"max_retries":5}"#).unwrap();

        assert_eq!(policy.max_retries(), 5);
        assert_eq!(policy.base_delay(), Duration::from_millis(1000));
        assert_eq!(policy.max_delay(), Duration::from_millis(10_000));
        assert_eq!(policy.jitter(), Jitter::Off);
    }

    #[test]
    fn test_unknown_jitter_mode_fails() {
        let result: Result<RetryPolicy, _> = serde_json::from_str(r#"{"jitter":"sometimes"}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown variant"));
    }

    #[test]
    fn test_negative_retries_fails() {
        let result: Result<RetryPolicy, _> = serde_json::from_str(r#"{"max_retries":-3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_embedded_in_config_struct() {
        let json = r#"{"endpoint":"api.example.com","retry":{"max_retries":2,"base_delay_ms":100,"max_delay_ms":400,"jitter":"equal"}}"#;
        let config: ServiceConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.endpoint, "api.example.com");
        assert_eq!(config.retry.max_retries(), 2);
        assert_eq!(config.retry.jitter(), Jitter::Equal);

        let restored: ServiceConfig =
            serde_json::from_str(&serde_json::to_string(&config).unwrap()).unwrap();
        assert_eq!(config, restored);
    }
}
