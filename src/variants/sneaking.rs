//! Sneaking and the observers who notice it.
//!
//! When someone spots a sneaking character, the observer gets a
//! [`SawSneaker`] linked as a dependent of the [`Sneaking`] effect. Ending
//! the sneak removes every such memory through cascade removal; an observer
//! who walks away forgets on their own.

use smallvec::SmallVec;

use crate::core::{EffectError, EffectId, EntityId};
use crate::effects::{Capability, CapabilitySet, Effect, Target};
use crate::engine::{EffectContext, EffectEngine};

/// The owner is moving stealthily.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sneaking {
    skill: u32,
    spotted_by: SmallVec<[EntityId; 4]>,
}

impl Sneaking {
    /// Type discriminator.
    pub const TYPE: &'static str = "Sneaking";

    /// Sneak with the given skill.
    #[must_use]
    pub fn new(skill: u32) -> Self {
        Self {
            skill,
            spotted_by: SmallVec::new(),
        }
    }

    /// Stealth skill.
    #[must_use]
    pub fn skill(&self) -> u32 {
        self.skill
    }

    /// Observers that have spotted the sneaker, in order.
    #[must_use]
    pub fn spotted_by(&self) -> &[EntityId] {
        &self.spotted_by
    }

    /// `observer` notices the sneak. Attaches a [`SawSneaker`] to the
    /// observer, linked so it goes away with the sneak.
    ///
    /// Returns `None` if the sneak is no longer active. Noticing twice
    /// returns the existing memory.
    pub fn spotted(
        engine: &mut EffectEngine,
        sneaking: EffectId,
        observer: EntityId,
    ) -> Result<Option<EffectId>, EffectError> {
        if !engine.is_active(sneaking) {
            return Ok(None);
        }
        let Some(sneaker) = engine.owner_of(sneaking) else {
            return Ok(None);
        };

        let existing = engine
            .effects_of_kind(observer, SawSneaker::TYPE)
            .into_iter()
            .find(|id| engine.get::<SawSneaker>(*id).is_some_and(|s| s.sneaker == sneaker));
        if existing.is_some() {
            return Ok(existing);
        }

        let saw = engine.add_effect(observer, Box::new(SawSneaker::new(sneaker)))?;
        engine.link_dependent(sneaking, saw);
        if let Some(state) = engine.get_mut::<Sneaking>(sneaking) {
            if !state.spotted_by.contains(&observer) {
                state.spotted_by.push(observer);
            }
        }
        tracing::debug!(%sneaker, %observer, "sneaker spotted");
        Ok(Some(saw))
    }
}

impl Effect for Sneaking {
    fn effect_type(&self) -> &'static str {
        Self::TYPE
    }

    fn describe(&self, _viewer: Option<EntityId>) -> String {
        format!(
            "Sneaking (skill {}, spotted by {})",
            self.skill,
            self.spotted_by.len()
        )
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::CombatEndCleanup])
    }

    fn on_removal(&mut self, ctx: &mut EffectContext<'_>) {
        ctx.message_owner("You stop sneaking.");
    }
}

/// The owner has noticed a sneaking character.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SawSneaker {
    sneaker: EntityId,
}

impl SawSneaker {
    /// Type discriminator.
    pub const TYPE: &'static str = "SawSneaker";

    /// Remember spotting `sneaker`.
    #[must_use]
    pub fn new(sneaker: EntityId) -> Self {
        Self { sneaker }
    }

    /// The spotted character.
    #[must_use]
    pub fn sneaker(&self) -> EntityId {
        self.sneaker
    }
}

impl Effect for SawSneaker {
    fn effect_type(&self) -> &'static str {
        Self::TYPE
    }

    fn describe(&self, _viewer: Option<EntityId>) -> String {
        format!("Has noticed {} sneaking", self.sneaker)
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::RemovedOnMove])
    }

    fn applies_to(&self, target: &Target<'_>) -> bool {
        target.entity() == Some(self.sneaker)
    }
}
