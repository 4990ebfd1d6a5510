//! Serde adapters storing [`Duration`] values as whole units.

/// Whole minutes, rounding partial minutes up on output.
pub(crate) mod minutes {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    use crate::time::whole_minutes;

    pub(crate) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(whole_minutes(*value))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        let minutes = u64::deserialize(deserializer)?;
        minutes
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or_else(|| serde::de::Error::custom("minute count overflows"))
    }
}

/// Whole seconds, rounding partial seconds up on output.
pub(crate) mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let rounded = value
            .as_secs()
            .saturating_add(u64::from(value.subsec_nanos() > 0));
        serializer.serialize_u64(rounded)
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
