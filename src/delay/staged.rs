//! Multi-stage delayed actions.
//!
//! A staged action is a small state machine driven by the scheduler:
//!
//! ```text
//! fire ─> run action[stage] ─> stage += 1 ─┬─ stage < target ─> reschedule (Retain)
//!                                          └─ stage == target ─> final callback,
//!                                                                DelayExpired, detach
//! ```
//!
//! It blocks its commands for the whole run, so an actor breaking down a
//! door cannot wander off between blows.

use serde::{Deserialize, Serialize};

use crate::core::{EffectError, EffectId, EntityId, Ticks};
use crate::effects::{Capability, CapabilitySet, Effect, Expiry};
use crate::engine::{EffectContext, EffectEngine, EngineEvent};

use super::blocking::{BlockList, Blocking};
use super::command::CompletionCallback;

/// One stage's action. Receives the stage being completed (1-based).
pub type StageAction = Box<dyn FnMut(&mut EffectContext<'_>, u32) + Send>;

/// Time between stages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageIntervals {
    /// Every stage takes the same time.
    Fixed(Ticks),
    /// Stage `i` waits `intervals[i]`; the last interval repeats.
    Variable(Vec<Ticks>),
}

impl StageIntervals {
    /// Wait before stage `index` (0-based) fires.
    #[must_use]
    pub fn interval(&self, index: u32) -> Ticks {
        match self {
            Self::Fixed(ticks) => *ticks,
            Self::Variable(list) => {
                let i = (index as usize).min(list.len().saturating_sub(1));
                list.get(i).copied().unwrap_or(Ticks::ZERO)
            }
        }
    }
}

/// A delay that fires a sequence of actions before completing.
pub struct StagedAction {
    commands: BlockList,
    reason: String,
    intervals: StageIntervals,
    target: u32,
    stage: u32,
    actions: Vec<StageAction>,
    on_complete: Option<CompletionCallback>,
}

impl StagedAction {
    /// Type discriminator.
    pub const TYPE: &'static str = "StagedAction";

    /// Create a staged action completing after `target` stages (at least one).
    pub fn new<I, S>(
        commands: I,
        reason: impl Into<String>,
        target: u32,
        intervals: StageIntervals,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: BlockList::new(commands),
            reason: reason.into(),
            intervals,
            target: target.max(1),
            stage: 0,
            actions: Vec::new(),
            on_complete: None,
        }
    }

    /// Append a stage action. Stage `i` runs action `i`; once the actions
    /// run out the last one repeats.
    #[must_use]
    pub fn with_action(
        mut self,
        action: impl FnMut(&mut EffectContext<'_>, u32) + Send + 'static,
    ) -> Self {
        self.actions.push(Box::new(action));
        self
    }

    /// Run `callback` after the final stage.
    #[must_use]
    pub fn with_on_complete(
        mut self,
        callback: impl FnMut(&mut EffectContext<'_>) + Send + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Wait before the first stage.
    #[must_use]
    pub fn first_interval(&self) -> Ticks {
        self.intervals.interval(0)
    }

    /// Attach to `owner` and schedule the first stage.
    pub fn start(self, engine: &mut EffectEngine, owner: EntityId) -> Result<EffectId, EffectError> {
        let first = self.first_interval();
        engine.add_effect_for(owner, Box::new(self), first)
    }

    /// Stages completed so far.
    #[must_use]
    pub fn stage(&self) -> u32 {
        self.stage
    }

    /// Stages needed to complete.
    #[must_use]
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Check if every stage has run.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.stage >= self.target
    }
}

impl std::fmt::Debug for StagedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedAction")
            .field("commands", &self.commands)
            .field("reason", &self.reason)
            .field("intervals", &self.intervals)
            .field("stage", &self.stage)
            .field("target", &self.target)
            .field("actions", &self.actions.len())
            .finish()
    }
}

impl Blocking for StagedAction {
    fn blocked_commands(&self) -> &[String] {
        self.commands.as_slice()
    }

    fn blocking_description(&self, _category: &str, _viewer: Option<EntityId>) -> String {
        self.reason.clone()
    }
}

impl Effect for StagedAction {
    fn effect_type(&self) -> &'static str {
        Self::TYPE
    }

    fn describe(&self, _viewer: Option<EntityId>) -> String {
        format!(
            "{} (stage {}/{}, blocking {})",
            self.reason, self.stage, self.target, self.commands
        )
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::BlocksCommands])
    }

    fn on_expire(&mut self, ctx: &mut EffectContext<'_>) -> Result<Expiry, EffectError> {
        let completing = self.stage + 1;
        if let Some(last) = self.actions.len().checked_sub(1) {
            let index = (self.stage as usize).min(last);
            (self.actions[index])(ctx, completing);
        }
        self.stage = completing;
        ctx.emit(EngineEvent::StageCompleted {
            effect: ctx.effect(),
            owner: ctx.owner(),
            stage: completing,
        });

        if self.is_complete() {
            if let Some(callback) = self.on_complete.as_mut() {
                callback(ctx);
            }
            ctx.emit(EngineEvent::DelayExpired {
                effect: ctx.effect(),
                owner: ctx.owner(),
                commands: self.commands.to_vec(),
            });
            return Ok(Expiry::Detach);
        }

        ctx.schedule_self(self.intervals.interval(self.stage));
        Ok(Expiry::Retain)
    }

    fn blocking(&self) -> Option<&dyn Blocking> {
        Some(self)
    }
}
