//! Combat resolution.
//!
//! Pure helpers (hit chance, mitigation, procs, durability) plus the
//! [`CombatResolver`] that runs them in the fixed pipeline order.

mod damage;
mod durability;
mod hit;
mod proc;
mod resolver;

pub use damage::{
    AppliedDamage, DamagePacket, DamageType, HealPacket, PacketOrigin, ResistTable, apply_damage,
    apply_heal, increase, mitigate,
};
pub use durability::{Wear, wear_random_armor, wear_weapon};
pub use hit::{check_hit, final_hit_chance};
pub use proc::{leach_amount, roll_procs};
pub use resolver::{AbortReason, CombatResolver, HitReport, SpellOutcome, SwingOutcome};
