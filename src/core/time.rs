//! Logical game time.
//!
//! The engine never looks at a wall clock. An external driver advances a
//! single logical clock; durations are measured in [`Ticks`] and due times
//! are absolute [`GameTime`] values.
//!
//! ```
//! use world_effects::core::{GameTime, Ticks};
//!
//! let now = GameTime::new(10);
//! let due = now + Ticks::new(5);
//! assert_eq!(due, GameTime::new(15));
//! assert_eq!(due.since(now), Ticks::new(5));
//! ```

use serde::{Deserialize, Serialize};

/// Absolute logical time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameTime(pub u64);

impl GameTime {
    /// The start of time.
    pub const ZERO: Self = Self(0);

    /// Create a new time value.
    #[must_use]
    pub const fn new(t: u64) -> Self {
        Self(t)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, zero if `earlier` is later.
    #[must_use]
    pub const fn since(self, earlier: GameTime) -> Ticks {
        Ticks(self.0.saturating_sub(earlier.0))
    }
}

impl std::ops::Add<Ticks> for GameTime {
    type Output = GameTime;

    fn add(self, rhs: Ticks) -> GameTime {
        GameTime(self.0.saturating_add(rhs.0))
    }
}

impl std::fmt::Display for GameTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t={}", self.0)
    }
}

/// A logical duration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticks(pub u64);

impl Ticks {
    /// No time at all.
    pub const ZERO: Self = Self(0);

    /// Create a new duration.
    #[must_use]
    pub const fn new(t: u64) -> Self {
        Self(t)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Ticks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_saturates() {
        let t = GameTime::new(u64::MAX - 1) + Ticks::new(10);
        assert_eq!(t, GameTime::new(u64::MAX));
    }

    #[test]
    fn test_since() {
        assert_eq!(GameTime::new(20).since(GameTime::new(5)), Ticks::new(15));
        assert_eq!(GameTime::new(5).since(GameTime::new(20)), Ticks::ZERO);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", GameTime::new(4)), "t=4");
        assert_eq!(format!("{}", Ticks::new(4)), "4 ticks");
    }
}
