//! The command blocking contract.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::EntityId;

/// Contract for effects that stop their owner from running commands.
///
/// Command dispatch (outside this crate) asks every effect on the actor
/// through `EffectEngine::blocking_reason` before running a command.
pub trait Blocking {
    /// Command names or category tags this effect blocks.
    fn blocked_commands(&self) -> &[String];

    /// Does this effect block `category`? Case-insensitive.
    fn is_blocking(&self, category: &str) -> bool {
        self.blocked_commands()
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    /// Why `category` is blocked, as shown to `viewer`.
    fn blocking_description(&self, category: &str, viewer: Option<EntityId>) -> String;
}

/// A case-insensitive set of blocked commands, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockList {
    commands: SmallVec<[String; 4]>,
}

impl BlockList {
    /// Build a block list. Case-insensitive duplicates are dropped.
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::default();
        for command in commands {
            list.insert(command);
        }
        list
    }

    /// Add a command. Returns false if it was already present.
    pub fn insert(&mut self, command: impl Into<String>) -> bool {
        let command = command.into();
        if self.contains(&command) {
            return false;
        }
        self.commands.push(command);
        true
    }

    /// Case-insensitive membership.
    #[must_use]
    pub fn contains(&self, category: &str) -> bool {
        self.commands.iter().any(|c| c.eq_ignore_ascii_case(category))
    }

    /// The commands, in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.commands
    }

    /// The commands as an owned list.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.commands.to_vec()
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if nothing is blocked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl std::fmt::Display for BlockList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.commands.join(", "))
    }
}
