//! Engine configuration.
//!
//! Hosts configure the engine at startup with an [`EngineConfig`]. Every
//! field has a sensible default, so most hosts only override one or two
//! settings via the builder methods or a JSON document.

use serde::{Deserialize, Serialize};

use super::error::EffectError;

/// Complete engine configuration.
///
/// ## Example
///
/// ```
/// use world_effects::core::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_event_buffer_limit(256)
///     .without_morph_schedule_carry();
///
/// assert_eq!(config.event_buffer_limit, Some(256));
/// assert!(!config.carry_schedule_on_morph);
///
/// let parsed = EngineConfig::from_json(r#"{ "reject_clock_rewind": false }"#).unwrap();
/// assert!(!parsed.reject_clock_rewind);
/// assert!(parsed.carry_schedule_on_morph);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// When an entity morphs, re-targeted effects inherit the remaining
    /// scheduled time of the effect they replace.
    pub carry_schedule_on_morph: bool,

    /// Maximum number of undrained outbound events. `None` for unbounded.
    /// When full, the oldest event is dropped.
    pub event_buffer_limit: Option<usize>,

    /// Ignore ticks whose time is earlier than the current clock.
    ///
    /// When false, a rewinding tick leaves the clock where it is but still
    /// fires entries due at or before the supplied time.
    pub reject_clock_rewind: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            carry_schedule_on_morph: true,
            event_buffer_limit: None,
            reject_clock_rewind: true,
        }
    }
}

impl EngineConfig {
    /// Create the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, EffectError> {
        serde_json::from_str(json).map_err(|e| EffectError::InvalidConfig(e.to_string()))
    }

    /// Bound the outbound event buffer.
    #[must_use]
    pub fn with_event_buffer_limit(mut self, limit: usize) -> Self {
        self.event_buffer_limit = Some(limit);
        self
    }

    /// Do not carry remaining schedule time across entity morphs.
    #[must_use]
    pub fn without_morph_schedule_carry(mut self) -> Self {
        self.carry_schedule_on_morph = false;
        self
    }

    /// Allow ticks earlier than the current clock to fire due entries.
    #[must_use]
    pub fn allow_clock_rewind(mut self) -> Self {
        self.reject_clock_rewind = false;
        self
    }
}
