//! Interruptible timed actions: bandaging and spell channeling.
//!
//! Both kinds share one book (an actor channels at most one action at a time)
//! but each has its own [`InterruptPolicy`]; neither governs the other.

use std::collections::BTreeMap;

use crate::env::SpellId;
use crate::state::ActorId;

/// Which events cut a channel short.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InterruptPolicy {
    pub on_damage: bool,
    pub on_move: bool,
    pub on_stun: bool,
}

impl InterruptPolicy {
    pub const ALWAYS: Self = Self {
        on_damage: true,
        on_move: true,
        on_stun: true,
    };

    pub const NEVER: Self = Self {
        on_damage: false,
        on_move: false,
        on_stun: false,
    };

    /// A lost target always interrupts, whatever the policy.
    pub const fn interrupts_on(&self, cause: InterruptCause) -> bool {
        match cause {
            InterruptCause::Damage => self.on_damage,
            InterruptCause::Movement => self.on_move,
            InterruptCause::Stun => self.on_stun,
            InterruptCause::TargetLost => true,
        }
    }
}

impl Default for InterruptPolicy {
    fn default() -> Self {
        Self::ALWAYS
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InterruptCause {
    Damage,
    Movement,
    Stun,
    /// Target died, despawned or moved out of reach.
    TargetLost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Bandage,
    Spell(SpellId),
}

/// One in-flight channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Channel {
    pub actor: ActorId,
    pub target: ActorId,
    pub kind: ChannelKind,
    pub remaining_ms: u32,
    pub total_ms: u32,
    /// Event sequence reserved when the channel started; keys its rolls.
    pub sequence: u64,
}

/// Both interruption policies, looked up by channel kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelPolicies {
    pub bandage: InterruptPolicy,
    pub spell: InterruptPolicy,
}

impl ChannelPolicies {
    pub const fn for_kind(&self, kind: ChannelKind) -> InterruptPolicy {
        match kind {
            ChannelKind::Bandage => self.bandage,
            ChannelKind::Spell(_) => self.spell,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChannelBook {
    channels: BTreeMap<ActorId, Channel>,
}

impl ChannelBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, actor: ActorId) -> Option<&Channel> {
        self.channels.get(&actor)
    }

    pub fn is_channeling(&self, actor: ActorId) -> bool {
        self.channels.contains_key(&actor)
    }

    /// Starts a channel. Fails with the running channel if one exists.
    pub fn start(&mut self, channel: Channel) -> Result<(), Channel> {
        match self.channels.get(&channel.actor) {
            Some(running) => Err(*running),
            None => {
                self.channels.insert(channel.actor, channel);
                Ok(())
            }
        }
    }

    /// Interrupts the actor's channel if its kind's policy honours `cause`.
    pub fn interrupt(
        &mut self,
        actor: ActorId,
        cause: InterruptCause,
        policies: &ChannelPolicies,
    ) -> Option<Channel> {
        let channel = self.channels.get(&actor)?;
        if !policies.for_kind(channel.kind).interrupts_on(cause) {
            return None;
        }
        self.channels.remove(&actor)
    }

    /// Removes every channel the actor runs or is the target of.
    pub fn cancel_involving(&mut self, actor: ActorId) -> Vec<Channel> {
        let affected: Vec<ActorId> = self
            .channels
            .values()
            .filter(|c| c.actor == actor || c.target == actor)
            .map(|c| c.actor)
            .collect();
        affected
            .into_iter()
            .filter_map(|a| self.channels.remove(&a))
            .collect()
    }

    /// Counts every channel down and returns those that finished.
    pub fn advance(&mut self, dt_ms: u32) -> Vec<Channel> {
        let mut finished = Vec::new();
        for channel in self.channels.values_mut() {
            channel.remaining_ms = channel.remaining_ms.saturating_sub(dt_ms);
            if channel.remaining_ms == 0 {
                finished.push(channel.actor);
            }
        }
        finished
            .into_iter()
            .filter_map(|actor| self.channels.remove(&actor))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
