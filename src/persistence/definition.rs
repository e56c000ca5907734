//! Persisted effect shapes.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::{EffectError, EffectId, EntityId, Ticks};

/// Current version of the saved-effects document.
pub const FORMAT_VERSION: u32 = 1;

/// One persisted effect: its type discriminator and a type-specific payload.
///
/// Payload fields that refer to other world entities hold stable numeric
/// ids, never live references.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectDefinition {
    /// Type discriminator, bound in the registry.
    pub effect_type: String,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
    /// Time left on the effect's schedule when it was saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<Ticks>,
}

impl EffectDefinition {
    /// Create an unscheduled definition.
    pub fn new(effect_type: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            effect_type: effect_type.into(),
            payload,
            remaining: None,
        }
    }

    /// Record the time left on the schedule.
    #[must_use]
    pub fn with_remaining(mut self, remaining: Option<Ticks>) -> Self {
        self.remaining = remaining;
        self
    }

    /// Decode the payload into a variant's saved state.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, EffectError> {
        T::deserialize(&self.payload).map_err(|source| EffectError::MalformedDefinition {
            effect_type: self.effect_type.clone(),
            source,
        })
    }
}

/// Every saving effect on one owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedEffects {
    /// Document version.
    pub version: u32,
    /// The owner entity.
    pub owner: EntityId,
    /// When the document was produced (RFC 3339, UTC).
    pub saved_at: DateTime<Utc>,
    /// Definitions in attachment order.
    pub effects: Vec<EffectDefinition>,
}

impl SavedEffects {
    /// Create an empty document.
    #[must_use]
    pub fn new(owner: EntityId, saved_at: DateTime<Utc>) -> Self {
        Self {
            version: FORMAT_VERSION,
            owner,
            saved_at,
            effects: Vec::new(),
        }
    }

    /// Number of saved effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if nothing was saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Encode as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, EffectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode from JSON.
    pub fn from_json(json: &str) -> Result<Self, EffectError> {
        let saved: Self = serde_json::from_str(json)?;
        if saved.version > FORMAT_VERSION {
            tracing::warn!(
                version = saved.version,
                supported = FORMAT_VERSION,
                owner = %saved.owner,
                "saved effects come from a newer format"
            );
        }
        Ok(saved)
    }
}

/// Outcome of loading saved effects.
///
/// Skipped effects are logged; none of them abort the load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Effects attached, in load order.
    pub loaded: Vec<EffectId>,
    /// Definitions whose type has no factory.
    pub skipped_unknown: usize,
    /// Definitions referring to entities that no longer exist.
    pub skipped_dangling: usize,
    /// Definitions whose payload failed to decode.
    pub skipped_malformed: usize,
}

impl LoadReport {
    /// Number of definitions skipped for any reason.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped_unknown + self.skipped_dangling + self.skipped_malformed
    }

    /// Check if every definition loaded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped() == 0
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: LoadReport) {
        self.loaded.extend(other.loaded);
        self.skipped_unknown += other.skipped_unknown;
        self.skipped_dangling += other.skipped_dangling;
        self.skipped_malformed += other.skipped_malformed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_decode_malformed() {
        #[derive(Debug, Deserialize)]
        struct Payload {
            #[allow(dead_code)]
            name: String,
        }

        let def = EffectDefinition::new("Marker", json!({ "name": 5 }));
        let err = def.decode::<Payload>().unwrap_err();
        assert!(matches!(err, EffectError::MalformedDefinition { ref effect_type, .. } if effect_type == "Marker"));
    }

    #[test]
    fn test_json_shape() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut saved = SavedEffects::new(EntityId(7), at);
        saved.effects.push(
            EffectDefinition::new("Marker", json!({ "name": "wet" })).with_remaining(Some(Ticks(30))),
        );

        let json = saved.to_json().unwrap();
        assert!(json.contains("\"saved_at\": \"2024-03-01T12:00:00Z\""));
        assert!(json.contains("\"remaining\": 30"));

        let back = SavedEffects::from_json(&json).unwrap();
        assert_eq!(back, saved);
    }

    #[test]
    fn test_remaining_is_optional() {
        let json = r#"{ "effect_type": "Marker", "payload": {} }"#;
        let def: EffectDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.remaining, None);
    }

    #[test]
    fn test_report_merge() {
        let mut report = LoadReport {
            loaded: vec![EffectId(1)],
            skipped_unknown: 1,
            ..LoadReport::default()
        };
        report.merge(LoadReport {
            loaded: vec![EffectId(2)],
            skipped_dangling: 2,
            ..LoadReport::default()
        });
        assert_eq!(report.loaded, vec![EffectId(1), EffectId(2)]);
        assert_eq!(report.skipped(), 3);
        assert!(!report.is_clean());
    }
}
