//! Single-shot command delay.

use crate::core::{EffectError, EntityId};
use crate::effects::{Capability, CapabilitySet, Effect, Expiry};
use crate::engine::{EffectContext, EngineEvent};

use super::blocking::{BlockList, Blocking};

/// Callback run when a delay completes.
pub type CompletionCallback = Box<dyn FnMut(&mut EffectContext<'_>) + Send>;

/// Blocks a set of commands until its timeout elapses.
///
/// On expiry it runs the completion callback (if any), raises
/// [`EngineEvent::DelayExpired`] with the blocked commands, and detaches.
pub struct CommandDelay {
    commands: BlockList,
    reason: String,
    on_complete: Option<CompletionCallback>,
}

impl CommandDelay {
    /// Type discriminator.
    pub const TYPE: &'static str = "CommandDelay";

    /// Block `commands` with a human-readable `reason`.
    pub fn new<I, S>(commands: I, reason: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            commands: BlockList::new(commands),
            reason: reason.into(),
            on_complete: None,
        }
    }

    /// Run `callback` when the delay completes.
    #[must_use]
    pub fn with_on_complete(
        mut self,
        callback: impl FnMut(&mut EffectContext<'_>) + Send + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// The blocked commands.
    #[must_use]
    pub fn commands(&self) -> &BlockList {
        &self.commands
    }

    /// Why the commands are blocked.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl std::fmt::Debug for CommandDelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDelay")
            .field("commands", &self.commands)
            .field("reason", &self.reason)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Blocking for CommandDelay {
    fn blocked_commands(&self) -> &[String] {
        self.commands.as_slice()
    }

    fn blocking_description(&self, _category: &str, _viewer: Option<EntityId>) -> String {
        self.reason.clone()
    }
}

impl Effect for CommandDelay {
    fn effect_type(&self) -> &'static str {
        Self::TYPE
    }

    fn describe(&self, _viewer: Option<EntityId>) -> String {
        format!("Delayed ({}): {}", self.commands, self.reason)
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::of(&[Capability::BlocksCommands])
    }

    fn on_expire(&mut self, ctx: &mut EffectContext<'_>) -> Result<Expiry, EffectError> {
        if let Some(callback) = self.on_complete.as_mut() {
            callback(ctx);
        }
        ctx.emit(EngineEvent::DelayExpired {
            effect: ctx.effect(),
            owner: ctx.owner(),
            commands: self.commands.to_vec(),
        });
        Ok(Expiry::Detach)
    }

    fn blocking(&self) -> Option<&dyn Blocking> {
        Some(self)
    }
}
