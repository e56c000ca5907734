//! The effect engine.
//!
//! `EffectEngine` owns every attached effect, the per-owner effect lists,
//! the scheduler and the combat subscription table. All mutation funnels
//! through a handful of paths:
//!
//! - `add_effect`: attach (and bind combat-linked effects)
//! - `expire`: run an expire hook, then detach unless the hook retains
//! - `detach`: the single removal path. It cancels the schedule, drops
//!   combat subscriptions, unlinks the owner, runs the removal hook once,
//!   and cascades to dependent effects.
//!
//! The engine is single-threaded. Hosts that share it across threads wrap
//! it in one lock held for a whole tick.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::combat::CombatHub;
use crate::core::{
    CombatId, EffectError, EffectId, EngineConfig, EntityId, EntityKind, GameTime, Ticks,
};
use crate::effects::{Capability, CapabilitySet, Contract, Effect, Expiry, Lifecycle, Target};
use crate::predicates::{ConditionContext, ConditionEvaluator, PredicateEvaluator};
use crate::schedule::Scheduler;

use super::context::EffectContext;
use super::events::{EngineEvent, RemovalReason};

/// What the engine knows about an owner entity.
#[derive(Clone, Debug, Default)]
pub struct OwnerRecord {
    kind: EntityKind,
    location: Option<EntityId>,
    combat: Option<CombatId>,
    /// Attached effects, in attachment order.
    effects: Vec<EffectId>,
}

impl OwnerRecord {
    /// Broad category of the entity.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Where the entity is.
    #[must_use]
    pub fn location(&self) -> Option<EntityId> {
        self.location
    }

    /// The combat the entity participates in.
    #[must_use]
    pub fn combat(&self) -> Option<CombatId> {
        self.combat
    }

    /// Attached effects, in attachment order.
    #[must_use]
    pub fn effects(&self) -> &[EffectId] {
        &self.effects
    }
}

/// A removal requested while the effect was lent to one of its hooks.
#[derive(Clone, Copy, Debug)]
struct PendingDetach {
    reason: RemovalReason,
    fire_removal: bool,
}

/// Storage for one attached effect.
struct EffectSlot {
    owner: EntityId,
    effect_type: &'static str,
    capabilities: CapabilitySet,
    state: Lifecycle,
    /// `None` while lent out to a hook.
    effect: Option<Box<dyn Effect>>,
    pending: Option<PendingDetach>,
}

/// The effect lifecycle engine.
///
/// ## Example
///
/// ```
/// use world_effects::core::{EntityId, EntityKind, GameTime, Ticks};
/// use world_effects::delay::CommandDelay;
/// use world_effects::engine::{EffectEngine, EngineEvent};
///
/// let mut engine = EffectEngine::default();
/// let hero = EntityId::new(1);
/// engine.spawn_entity(hero, EntityKind::Character);
///
/// let delay = CommandDelay::new(["move", "flee"], "You are still recovering.");
/// engine.add_effect_for(hero, Box::new(delay), Ticks::new(5)).unwrap();
/// assert!(engine.is_blocked(hero, "MOVE"));
///
/// engine.tick(GameTime::new(5));
/// assert!(!engine.is_blocked(hero, "move"));
/// assert!(engine
///     .drain_events()
///     .iter()
///     .any(|e| matches!(e, EngineEvent::DelayExpired { .. })));
/// ```
pub struct EffectEngine {
    config: EngineConfig,

    /// Owner entities by id.
    owners: FxHashMap<EntityId, OwnerRecord>,

    /// Attached effects by id.
    slots: FxHashMap<EffectId, EffectSlot>,

    /// Logical clock and due-time table.
    scheduler: Scheduler,

    /// Combat notification subscriptions.
    combats: CombatHub,

    /// Parent effect -> effects removed along with it.
    dependents: FxHashMap<EffectId, SmallVec<[EffectId; 4]>>,

    /// Undrained outbound events.
    outbox: VecDeque<EngineEvent>,

    /// Host predicate engine for external conditions.
    evaluator: Option<Box<dyn PredicateEvaluator>>,

    /// Next effect id to allocate.
    next_effect: EffectId,

    /// Set while a tick is firing expirations.
    ticking: bool,
}

impl Default for EffectEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for EffectEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectEngine")
            .field("now", &self.scheduler.now())
            .field("owners", &self.owners.len())
            .field("effects", &self.slots.len())
            .field("scheduled", &self.scheduler.len())
            .field("pending_events", &self.outbox.len())
            .finish()
    }
}

impl EffectEngine {
    /// Create an engine with the given configuration.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            owners: FxHashMap::default(),
            slots: FxHashMap::default(),
            scheduler: Scheduler::new(),
            combats: CombatHub::new(),
            dependents: FxHashMap::default(),
            outbox: VecDeque::new(),
            evaluator: None,
            next_effect: EffectId::FIRST,
            ticking: false,
        }
    }

    /// Install the host predicate engine (builder pattern).
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: impl PredicateEvaluator + 'static) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    /// Install or replace the host predicate engine.
    pub fn set_evaluator(&mut self, evaluator: Box<dyn PredicateEvaluator>) {
        self.evaluator = Some(evaluator);
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current logical time.
    #[must_use]
    pub fn now(&self) -> GameTime {
        self.scheduler.now()
    }

    /// The scheduler (read-only).
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The combat subscription table (read-only).
    #[must_use]
    pub fn combats(&self) -> &CombatHub {
        &self.combats
    }

    // === Owners ===

    /// Register an owner entity. Returns false if it already exists.
    pub fn spawn_entity(&mut self, id: EntityId, kind: EntityKind) -> bool {
        if self.owners.contains_key(&id) {
            return false;
        }
        self.owners.insert(
            id,
            OwnerRecord {
                kind,
                ..OwnerRecord::default()
            },
        );
        true
    }

    /// Destroy an owner, removing every effect attached to it.
    pub fn despawn_entity(&mut self, id: EntityId) -> bool {
        // Drop the record first so removal hooks cannot attach to it.
        let Some(record) = self.owners.remove(&id) else {
            return false;
        };
        for effect in record.effects {
            self.detach(effect, RemovalReason::OwnerDestroyed, true);
        }
        tracing::debug!(entity = %id, "despawned entity");
        true
    }

    /// Check if an owner entity exists.
    #[must_use]
    pub fn entity_exists(&self, id: EntityId) -> bool {
        self.owners.contains_key(&id)
    }

    /// Get an owner record.
    #[must_use]
    pub fn owner_record(&self, id: EntityId) -> Option<&OwnerRecord> {
        self.owners.get(&id)
    }

    /// Kind of an entity.
    #[must_use]
    pub fn kind_of(&self, id: EntityId) -> Option<EntityKind> {
        self.owners.get(&id).map(|r| r.kind)
    }

    /// Location of an entity.
    #[must_use]
    pub fn location_of(&self, id: EntityId) -> Option<EntityId> {
        self.owners.get(&id).and_then(|r| r.location)
    }

    /// Combat an entity participates in.
    #[must_use]
    pub fn combat_of(&self, id: EntityId) -> Option<CombatId> {
        self.owners.get(&id).and_then(|r| r.combat)
    }

    /// All known entity ids, sorted.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        let mut ids: Vec<_> = self.owners.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Place an entity without treating it as a move (initial placement,
    /// load). Does not remove move-sensitive effects.
    pub fn place_entity(&mut self, id: EntityId, location: Option<EntityId>) -> Result<(), EffectError> {
        let record = self.owners.get_mut(&id).ok_or(EffectError::UnknownEntity(id))?;
        record.location = location;
        Ok(())
    }

    /// Move an entity. Effects that are removed on move are removed.
    ///
    /// Returns the number of effects removed.
    pub fn move_entity(&mut self, id: EntityId, location: Option<EntityId>) -> Result<usize, EffectError> {
        let record = self.owners.get_mut(&id).ok_or(EffectError::UnknownEntity(id))?;
        record.location = location;
        Ok(self.remove_with_capability(id, Capability::RemovedOnMove, RemovalReason::OwnerMoved))
    }

    /// Put an entity into a combat, leaving any other combat first.
    pub fn enter_combat(&mut self, id: EntityId, combat: CombatId) -> Result<(), EffectError> {
        let current = self
            .owners
            .get(&id)
            .ok_or(EffectError::UnknownEntity(id))?
            .combat;
        if current == Some(combat) {
            return Ok(());
        }
        if current.is_some() {
            self.leave_combat(id)?;
        }
        if let Some(record) = self.owners.get_mut(&id) {
            record.combat = Some(combat);
        }
        Ok(())
    }

    /// Take an entity out of combat. Combat-end cleanup effects are removed.
    ///
    /// Returns the number of effects removed.
    pub fn leave_combat(&mut self, id: EntityId) -> Result<usize, EffectError> {
        let record = self.owners.get_mut(&id).ok_or(EffectError::UnknownEntity(id))?;
        if record.combat.take().is_none() {
            return Ok(0);
        }
        Ok(self.remove_with_capability(id, Capability::CombatEndCleanup, RemovalReason::LeftCombat))
    }

    /// A combat ended: expire every effect bound to it and take every
    /// participant out of it.
    ///
    /// Returns the number of bound effects expired.
    pub fn end_combat(&mut self, combat: CombatId) -> usize {
        let mut expired = 0;
        for effect in self.combats.take_subscribers(combat) {
            self.scheduler.cancel(effect);
            if self.expire(effect, RemovalReason::CombatEnded) {
                expired += 1;
            }
        }

        let mut participants: Vec<_> = self
            .owners
            .iter()
            .filter(|(_, r)| r.combat == Some(combat))
            .map(|(id, _)| *id)
            .collect();
        participants.sort_unstable();
        for id in participants {
            if let Some(record) = self.owners.get_mut(&id) {
                record.combat = None;
            }
            self.remove_with_capability(id, Capability::CombatEndCleanup, RemovalReason::CombatEnded);
        }

        tracing::debug!(%combat, expired, "combat ended");
        expired
    }

    /// A combat merged into another: move subscriptions, rebind effects and
    /// move participants.
    ///
    /// Returns the number of effects rebound.
    pub fn merge_combat(&mut self, old: CombatId, new: CombatId) -> usize {
        let moved = self.combats.merge(old, new);
        for id in &moved {
            let linked = self
                .slots
                .get_mut(id)
                .and_then(|slot| slot.effect.as_deref_mut())
                .and_then(|effect| effect.combat_linked_mut());
            if let Some(linked) = linked {
                linked.binding_mut().rebind(old, new);
            }
        }

        for record in self.owners.values_mut() {
            if record.combat == Some(old) {
                record.combat = Some(new);
            }
        }

        tracing::debug!(%old, %new, rebound = moved.len(), "combat merged");
        moved.len()
    }

    // === Effects ===

    /// Attach an effect to an owner.
    ///
    /// Combat-linked effects are bound to the owner's current combat.
    pub fn add_effect(&mut self, owner: EntityId, mut effect: Box<dyn Effect>) -> Result<EffectId, EffectError> {
        let record = self.owners.get_mut(&owner).ok_or(EffectError::UnknownEntity(owner))?;
        let id = self.next_effect;
        self.next_effect = id.next();
        record.effects.push(id);
        let combat = record.combat;

        let effect_type = effect.effect_type();
        let capabilities = effect.capabilities();
        if capabilities.contains(Capability::CombatLinked) {
            match effect.combat_linked_mut() {
                Some(linked) => {
                    linked.binding_mut().bind(combat);
                    if let Some(combat) = combat {
                        self.combats.subscribe(id, combat);
                    }
                }
                None => tracing::warn!(
                    effect_type,
                    "declares CombatLinked but exposes no binding"
                ),
            }
        }

        self.slots.insert(
            id,
            EffectSlot {
                owner,
                effect_type,
                capabilities,
                state: Lifecycle::Active,
                effect: Some(effect),
                pending: None,
            },
        );
        tracing::trace!(effect = %id, %owner, effect_type, "effect attached");
        self.emit(EngineEvent::EffectAdded {
            effect: id,
            owner,
            effect_type: effect_type.to_string(),
        });
        Ok(id)
    }

    /// Attach an effect and schedule it to expire after `duration`.
    pub fn add_effect_for(
        &mut self,
        owner: EntityId,
        effect: Box<dyn Effect>,
        duration: Ticks,
    ) -> Result<EffectId, EffectError> {
        let id = self.add_effect(owner, effect)?;
        self.schedule(id, duration);
        Ok(id)
    }

    /// Remove an effect. With `fire_removal` false the removal hook is
    /// skipped; schedules and subscriptions are released either way.
    ///
    /// Returns false if the effect was not live.
    pub fn remove_effect(&mut self, effect: EffectId, fire_removal: bool) -> bool {
        self.detach(effect, RemovalReason::Explicit, fire_removal)
    }

    /// Expire an effect now, as if its timeout had elapsed.
    ///
    /// Any pending schedule entry is dropped first.
    pub fn expire_effect(&mut self, effect: EffectId) -> bool {
        if !self.is_active(effect) {
            return false;
        }
        self.scheduler.cancel(effect);
        self.expire(effect, RemovalReason::Expired)
    }

    /// Lifecycle state of an effect. Unknown ids are `Detached`.
    #[must_use]
    pub fn lifecycle(&self, effect: EffectId) -> Lifecycle {
        self.slots.get(&effect).map_or(Lifecycle::Detached, |s| s.state)
    }

    /// Check if an effect is Active.
    #[must_use]
    pub fn is_active(&self, effect: EffectId) -> bool {
        self.lifecycle(effect) == Lifecycle::Active
    }

    /// Owner of a live effect.
    #[must_use]
    pub fn owner_of(&self, effect: EffectId) -> Option<EntityId> {
        self.slots.get(&effect).map(|s| s.owner)
    }

    /// Type discriminator of a live effect.
    #[must_use]
    pub fn effect_type_of(&self, effect: EffectId) -> Option<&'static str> {
        self.slots.get(&effect).map(|s| s.effect_type)
    }

    /// Borrow a live effect.
    #[must_use]
    pub fn effect(&self, effect: EffectId) -> Option<&(dyn Effect + 'static)> {
        self.slots.get(&effect).and_then(|s| s.effect.as_deref())
    }

    /// Borrow a live effect mutably.
    pub fn effect_mut(&mut self, effect: EffectId) -> Option<&mut (dyn Effect + 'static)> {
        self.slots.get_mut(&effect).and_then(|s| s.effect.as_deref_mut())
    }

    /// Borrow a live effect as a concrete variant.
    #[must_use]
    pub fn get<T: Effect>(&self, effect: EffectId) -> Option<&T> {
        self.effect(effect).and_then(|e| e.downcast_ref::<T>())
    }

    /// Borrow a live effect as a concrete variant, mutably.
    pub fn get_mut<T: Effect>(&mut self, effect: EffectId) -> Option<&mut T> {
        self.effect_mut(effect).and_then(|e| e.downcast_mut::<T>())
    }

    /// Effects attached to an owner, in attachment order.
    #[must_use]
    pub fn effects_of(&self, owner: EntityId) -> &[EffectId] {
        self.owners
            .get(&owner)
            .map(|r| r.effects.as_slice())
            .unwrap_or_default()
    }

    /// Active effects of a concrete variant on an owner.
    #[must_use]
    pub fn effects_of_type<T: Effect>(&self, owner: EntityId) -> Vec<&T> {
        self.live_effects(owner)
            .filter_map(|(_, effect)| effect.downcast_ref::<T>())
            .collect()
    }

    /// Effects on an owner with the given type discriminator.
    #[must_use]
    pub fn effects_of_kind(&self, owner: EntityId, effect_type: &str) -> Vec<EffectId> {
        self.effects_of(owner)
            .iter()
            .copied()
            .filter(|id| self.slots.get(id).is_some_and(|s| s.effect_type == effect_type))
            .collect()
    }

    /// Does the owner have an effect with this type discriminator?
    #[must_use]
    pub fn has_effect_of_type(&self, owner: EntityId, effect_type: &str) -> bool {
        !self.effects_of_kind(owner, effect_type).is_empty()
    }

    /// Effects on an owner that declare a capability.
    #[must_use]
    pub fn effects_with(&self, owner: EntityId, capability: Capability) -> Vec<EffectId> {
        self.effects_of(owner)
            .iter()
            .copied()
            .filter(|id| {
                self.slots
                    .get(id)
                    .is_some_and(|s| s.capabilities.contains(capability))
            })
            .collect()
    }

    /// Describe a live effect.
    #[must_use]
    pub fn describe(&self, effect: EffectId, viewer: Option<EntityId>) -> Option<String> {
        self.effect(effect).map(|e| e.describe(viewer))
    }

    /// Describe every active effect on an owner, in attachment order.
    #[must_use]
    pub fn describe_all(&self, owner: EntityId, viewer: Option<EntityId>) -> Vec<String> {
        self.live_effects(owner)
            .map(|(_, effect)| effect.describe(viewer))
            .collect()
    }

    /// Does an effect apply to a target?
    ///
    /// Runs the variant's structural check, then its condition (if any).
    /// Detached effects apply to nothing.
    #[must_use]
    pub fn effect_applies(&self, effect: EffectId, target: &Target<'_>) -> bool {
        let Some(slot) = self.slots.get(&effect) else {
            return false;
        };
        if slot.state != Lifecycle::Active {
            return false;
        }
        let Some(effect) = slot.effect.as_deref() else {
            return false;
        };
        if !effect.applies_to(target) {
            return false;
        }
        let Some(condition) = effect.condition() else {
            return true;
        };

        let target_kind = target.entity().and_then(|e| self.kind_of(e));
        let mut ctx = ConditionContext::new(slot.owner, target).with_target_kind(target_kind);
        if let Some(evaluator) = self.evaluator.as_deref() {
            ctx = ctx.with_evaluator(evaluator);
        }
        ConditionEvaluator::evaluate(condition, &ctx)
    }

    /// Why an owner may not run a command, if something blocks it.
    #[must_use]
    pub fn blocking_reason(&self, owner: EntityId, command: &str) -> Option<String> {
        self.live_effects(owner).find_map(|(_, effect)| {
            match effect.contract(Capability::BlocksCommands) {
                Some(Contract::BlocksCommands(blocking)) if blocking.is_blocking(command) => {
                    Some(blocking.blocking_description(command, Some(owner)))
                }
                _ => None,
            }
        })
    }

    /// Is the owner blocked from running a command?
    #[must_use]
    pub fn is_blocked(&self, owner: EntityId, command: &str) -> bool {
        self.blocking_reason(owner, command).is_some()
    }

    /// Short and full description override for an owner, as seen by
    /// `viewer`. The most recently attached override wins.
    #[must_use]
    pub fn description_override(
        &self,
        owner: EntityId,
        viewer: Option<EntityId>,
    ) -> Option<(String, String)> {
        let live: Vec<_> = self.live_effects(owner).collect();
        live.into_iter().rev().find_map(|(id, effect)| {
            if !self.effect_applies(id, &viewer.map_or(Target::None, Target::Entity)) {
                return None;
            }
            match effect.contract(Capability::OverridesDescription) {
                Some(Contract::OverridesDescription(over)) => Some((
                    over.short_description(viewer),
                    over.full_description(viewer),
                )),
                _ => None,
            }
        })
    }

    /// Why an owner may not change into `position`, if something prevents it.
    #[must_use]
    pub fn position_change_blocker(&self, owner: EntityId, position: &str) -> Option<String> {
        self.live_effects(owner).find_map(|(_, effect)| {
            match effect.contract(Capability::PreventsPositionChange) {
                Some(Contract::PreventsPositionChange(lock))
                    if lock.prevents_position_change(position) =>
                {
                    Some(lock.position_lock_reason(position))
                }
                _ => None,
            }
        })
    }

    /// Number of live effects across all owners.
    #[must_use]
    pub fn effect_count(&self) -> usize {
        self.slots.len()
    }

    // === Dependents ===

    /// Remove `child` whenever `parent` leaves Active.
    ///
    /// Returns false if either effect is not live.
    pub fn link_dependent(&mut self, parent: EffectId, child: EffectId) -> bool {
        if parent == child || !self.slots.contains_key(&parent) || !self.slots.contains_key(&child) {
            return false;
        }
        let slots = &self.slots;
        let children = self.dependents.entry(parent).or_default();
        children.retain(|c| slots.contains_key(c));
        if !children.contains(&child) {
            children.push(child);
        }
        true
    }

    /// Live dependents of an effect.
    #[must_use]
    pub fn dependents_of(&self, parent: EffectId) -> Vec<EffectId> {
        self.dependents
            .get(&parent)
            .map(|children| {
                children
                    .iter()
                    .copied()
                    .filter(|c| self.slots.contains_key(c))
                    .collect()
            })
            .unwrap_or_default()
    }

    // === Morph ===

    /// `new` replaces `old` in place. Every effect on `old` that knows how
    /// to re-target produces a replacement on `new`; the original is then
    /// removed from `old`.
    ///
    /// Returns the ids of the effects attached to `new`.
    pub fn morph_entity(&mut self, old: EntityId, new: EntityId) -> Result<Vec<EffectId>, EffectError> {
        let old_effects = self
            .owners
            .get(&old)
            .ok_or(EffectError::UnknownEntity(old))?
            .effects
            .clone();
        if !self.owners.contains_key(&new) {
            return Err(EffectError::UnknownEntity(new));
        }

        let mut replacements = Vec::new();
        for id in old_effects {
            let Some(effect) = self.effect(id) else {
                continue;
            };
            let Some(replacement) = effect.on_entity_morph(old, new) else {
                continue;
            };
            let remaining = if self.config.carry_schedule_on_morph {
                self.scheduler.remaining(id)
            } else {
                None
            };
            replacements.push((id, replacement, remaining));
        }

        let mut added = Vec::with_capacity(replacements.len());
        for (original, replacement, remaining) in replacements {
            let id = self.add_effect(new, replacement)?;
            if let Some(remaining) = remaining {
                self.schedule(id, remaining);
            }
            self.detach(original, RemovalReason::Morphed, true);
            added.push(id);
        }

        tracing::debug!(%old, %new, carried = added.len(), "entity morphed");
        Ok(added)
    }

    // === Scheduling ===

    /// Schedule an effect to expire after `duration`, replacing any
    /// existing schedule. Returns false if the effect is not live.
    pub fn schedule(&mut self, effect: EffectId, duration: Ticks) -> bool {
        if !self.is_schedulable(effect) {
            return false;
        }
        self.scheduler.add(effect, duration);
        true
    }

    /// Reschedule only if the new due time is later than the current one.
    /// Returns true if the schedule changed.
    pub fn reschedule_if_longer(&mut self, effect: EffectId, duration: Ticks) -> bool {
        if !self.is_schedulable(effect) {
            return false;
        }
        self.scheduler.reschedule_if_longer(effect, duration)
    }

    /// Drop an effect's schedule without expiring it.
    pub fn cancel_schedule(&mut self, effect: EffectId) -> bool {
        self.scheduler.cancel(effect).is_some()
    }

    /// Time until an effect fires, if scheduled.
    #[must_use]
    pub fn remaining(&self, effect: EffectId) -> Option<Ticks> {
        self.scheduler.remaining(effect)
    }

    /// Absolute time an effect fires, if scheduled.
    #[must_use]
    pub fn due_time(&self, effect: EffectId) -> Option<GameTime> {
        self.scheduler.due_time(effect)
    }

    /// Advance the clock to `now` and fire every expiration due by then.
    ///
    /// Due entries are snapshotted before any hook runs; anything scheduled
    /// during this tick waits for the next one. Returns the number of
    /// expirations fired.
    pub fn tick(&mut self, now: GameTime) -> usize {
        if self.ticking {
            tracing::warn!(%now, "nested tick ignored");
            return 0;
        }
        if now < self.scheduler.now() {
            if self.config.reject_clock_rewind {
                tracing::warn!(%now, current = %self.scheduler.now(), "clock rewind ignored");
                return 0;
            }
        } else {
            self.scheduler.advance_to(now);
        }

        let due = self.scheduler.due_snapshot(now);
        if due.is_empty() {
            return 0;
        }

        self.ticking = true;
        let mut fired = 0;
        for key in due {
            if !self.scheduler.consume(key) {
                continue;
            }
            if self.expire(key.effect, RemovalReason::Expired) {
                fired += 1;
            }
        }
        self.ticking = false;

        tracing::trace!(%now, fired, "tick processed");
        fired
    }

    /// Advance the clock by `ticks`.
    pub fn advance(&mut self, ticks: Ticks) -> usize {
        self.tick(self.now() + ticks)
    }

    // === Events ===

    /// Queue an outbound event.
    pub fn emit(&mut self, event: EngineEvent) {
        if let Some(limit) = self.config.event_buffer_limit {
            if limit == 0 {
                return;
            }
            while self.outbox.len() >= limit {
                if let Some(dropped) = self.outbox.pop_front() {
                    tracing::warn!(?dropped, limit, "event buffer full, dropping oldest event");
                }
            }
        }
        self.outbox.push_back(event);
    }

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        self.outbox.drain(..).collect()
    }

    /// Peek at queued events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &EngineEvent> {
        self.outbox.iter()
    }

    // === Internals ===

    fn is_schedulable(&self, effect: EffectId) -> bool {
        matches!(self.lifecycle(effect), Lifecycle::Active | Lifecycle::Expired)
    }

    fn live_effects(&self, owner: EntityId) -> impl Iterator<Item = (EffectId, &(dyn Effect + 'static))> + '_ {
        self.effects_of(owner).iter().filter_map(move |id| {
            let slot = self.slots.get(id)?;
            if slot.state != Lifecycle::Active {
                return None;
            }
            slot.effect.as_deref().map(|effect| (*id, effect))
        })
    }

    fn remove_with_capability(
        &mut self,
        owner: EntityId,
        capability: Capability,
        reason: RemovalReason,
    ) -> usize {
        self.effects_with(owner, capability)
            .into_iter()
            .filter(|id| self.detach(*id, reason, true))
            .count()
    }

    /// Lend an effect to a hook, then put it back.
    fn with_lent<R>(
        &mut self,
        id: EffectId,
        hook: impl FnOnce(&mut dyn Effect, &mut EffectContext<'_>) -> R,
    ) -> Option<R> {
        let slot = self.slots.get_mut(&id)?;
        let owner = slot.owner;
        let mut effect = slot.effect.take()?;

        let result = {
            let mut ctx = EffectContext::new(self, id, owner);
            hook(effect.as_mut(), &mut ctx)
        };

        // A merge may have moved the subscription while the effect was out.
        if let Some(linked) = effect.combat_linked_mut() {
            let held = self.combats.subscription_of(id);
            if held.is_some() && linked.combat() != held {
                linked.binding_mut().bind(held);
            }
        }

        if let Some(slot) = self.slots.get_mut(&id) {
            slot.effect = Some(effect);
        }
        Some(result)
    }

    /// Run an effect's expire hook and detach it unless it retains itself.
    fn expire(&mut self, id: EffectId, reason: RemovalReason) -> bool {
        let Some(slot) = self.slots.get_mut(&id) else {
            return false;
        };
        if slot.state != Lifecycle::Active || slot.effect.is_none() {
            return false;
        }
        slot.state = Lifecycle::Expired;
        let owner = slot.owner;
        let effect_type = slot.effect_type;

        let outcome = self.with_lent(id, |effect, ctx| effect.on_expire(ctx));
        let pending = self.slots.get_mut(&id).and_then(|slot| slot.pending.take());

        match outcome {
            Some(Ok(Expiry::Retain)) => {
                if let Some(slot) = self.slots.get_mut(&id) {
                    slot.state = Lifecycle::Active;
                }
                match pending {
                    Some(pending) => {
                        self.detach(id, pending.reason, pending.fire_removal);
                    }
                    None => self.emit(EngineEvent::EffectRetained {
                        effect: id,
                        owner,
                        effect_type: effect_type.to_string(),
                    }),
                }
            }
            Some(Ok(Expiry::Detach)) | None => {
                self.emit(EngineEvent::EffectExpired {
                    effect: id,
                    owner,
                    effect_type: effect_type.to_string(),
                });
                // A removal requested by the hook keeps its own reason and flag.
                match pending {
                    Some(pending) => self.detach(id, pending.reason, pending.fire_removal),
                    None => self.detach(id, reason, true),
                };
            }
            Some(Err(err)) => {
                tracing::warn!(effect = %id, effect_type, error = %err, "expire hook failed, detaching");
                self.emit(EngineEvent::EffectExpired {
                    effect: id,
                    owner,
                    effect_type: effect_type.to_string(),
                });
                let fire_removal = pending.map_or(true, |p| p.fire_removal);
                self.detach(id, RemovalReason::HookFailed, fire_removal);
            }
        }
        true
    }

    /// The single removal path.
    fn detach(&mut self, id: EffectId, reason: RemovalReason, fire_removal: bool) -> bool {
        let Some(slot) = self.slots.get_mut(&id) else {
            return false;
        };
        if matches!(slot.state, Lifecycle::Removed | Lifecycle::Detached) {
            return false;
        }
        if slot.effect.is_none() {
            // Lent to one of its own hooks; finish once the hook returns.
            slot.pending.get_or_insert(PendingDetach {
                reason,
                fire_removal,
            });
            return true;
        }

        slot.state = Lifecycle::Removed;
        let owner = slot.owner;
        let effect_type = slot.effect_type;

        self.scheduler.cancel(id);
        self.combats.unsubscribe(id);
        if let Some(record) = self.owners.get_mut(&owner) {
            record.effects.retain(|e| *e != id);
        }

        if fire_removal {
            self.with_lent(id, |effect, ctx| effect.on_removal(ctx));
        }
        self.slots.remove(&id);

        tracing::trace!(effect = %id, %owner, effect_type, ?reason, "effect detached");
        self.emit(EngineEvent::EffectRemoved {
            effect: id,
            owner,
            effect_type: effect_type.to_string(),
            reason,
        });

        if let Some(children) = self.dependents.remove(&id) {
            for child in children {
                self.detach(child, RemovalReason::Cascade, true);
            }
        }
        true
    }
}
