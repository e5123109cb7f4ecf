use crate::state::ActorId;

/// Externally computed attack legality: a verdict plus the resolved target.
///
/// The core consumes this as an opaque precondition and never re-derives
/// hostility, PvP rules or scene permissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttackLegality {
    pub allowed: bool,
    pub target: ActorId,
}

impl AttackLegality {
    pub const fn allow(target: ActorId) -> Self {
        Self {
            allowed: true,
            target,
        }
    }

    pub const fn deny(target: ActorId) -> Self {
        Self {
            allowed: false,
            target,
        }
    }
}

pub trait LegalityOracle: Send + Sync {
    fn check(&self, attacker: ActorId, target: ActorId) -> AttackLegality;
}

impl<F> LegalityOracle for F
where
    F: Fn(ActorId, ActorId) -> AttackLegality + Send + Sync,
{
    fn check(&self, attacker: ActorId, target: ActorId) -> AttackLegality {
        self(attacker, target)
    }
}

/// Permits every attack against the requested target.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl LegalityOracle for AllowAll {
    fn check(&self, _attacker: ActorId, target: ActorId) -> AttackLegality {
        AttackLegality::allow(target)
    }
}
