//! The fixed-order swing pipeline.
//!
//! ```text
//! revalidate → consume → roll hit → (miss: stop)
//!     → damage → procs → leach → durability → Hit event → death check
//! ```
//!
//! Each step may abort the rest. Nothing before the consume step spends
//! resources; anything after it keeps the spend.

use tracing::{debug, trace, warn};

use super::durability::{Wear, wear_random_armor, wear_weapon};
use super::hit::{check_hit, final_hit_chance};
use super::proc::{leach_amount, roll_procs};
use super::{
    AppliedDamage, DamagePacket, HealPacket, PacketOrigin, apply_damage, apply_heal, increase,
    mitigate,
};
use crate::config::CombatConfig;
use crate::env::{CombatEnv, RollKey, RollKind, SpellDefinition};
use crate::events::{CombatEvent, EventQueue, KillContext};
use crate::state::{ActorId, ActorRecord};
use crate::tracker::CombatStateTracker;

/// Why a swing or spell landing stopped before rolling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbortReason {
    AttackerDead,
    TargetDead,
    OutOfRange,
    Illegal,
    /// `canAttack` is currently false.
    Gated,
    /// Not enough stamina or ammunition.
    Starved,
}

impl AbortReason {
    /// Gating and starvation pause the session; everything else ends it.
    pub const fn pauses(self) -> bool {
        matches!(self, Self::Gated | Self::Starved)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HitReport {
    pub raw: u32,
    pub amount: u32,
    /// HP removed by the primary packet.
    pub dealt: u32,
    pub procs: u8,
    /// HP removed by every packet of this swing.
    pub total_dealt: u32,
    pub killed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwingOutcome {
    Aborted(AbortReason),
    Missed,
    Hit(HitReport),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpellOutcome {
    Aborted(AbortReason),
    Landed { dealt: u32, killed: bool },
}

/// Borrowed context for one resolution.
pub struct CombatResolver<'a> {
    env: CombatEnv<'a>,
    config: &'a CombatConfig,
    tracker: &'a mut CombatStateTracker,
    events: &'a mut EventQueue,
    now_ms: u64,
}

impl<'a> CombatResolver<'a> {
    pub fn new(
        env: CombatEnv<'a>,
        config: &'a CombatConfig,
        tracker: &'a mut CombatStateTracker,
        events: &'a mut EventQueue,
        now_ms: u64,
    ) -> Self {
        Self {
            env,
            config,
            tracker,
            events,
            now_ms,
        }
    }

    /// Resolves one elapsed swing. Called exactly once per `Ready` session.
    pub fn resolve_swing(
        &mut self,
        attacker: &mut ActorRecord,
        defender: &mut ActorRecord,
    ) -> SwingOutcome {
        // 1. revalidate
        let weapon = attacker.snapshot().weapon;
        if let Err(reason) = self.revalidate(attacker, defender, weapon.range) {
            debug!(
                target: "combat::engine",
                attacker = %attacker.id,
                target = %defender.id,
                ?reason,
                "swing aborted"
            );
            return SwingOutcome::Aborted(reason);
        }
        if !attacker.snapshot().can_attack() {
            return SwingOutcome::Aborted(AbortReason::Gated);
        }
        let ammo_ok = weapon.ammo.is_none_or(|ammo| attacker.backpack.count(ammo) > 0);
        if attacker.vitals.stamina.current < weapon.stamina_cost || !ammo_ok {
            return SwingOutcome::Aborted(AbortReason::Starved);
        }

        // 2. consume, hit or miss
        attacker.vitals.stamina.drain(weapon.stamina_cost);
        if let Some(ammo) = weapon.ammo {
            attacker.backpack.consume(ammo, 1);
        }

        // 3. roll hit
        let sequence = attacker.next_sequence();
        let attacker_id = attacker.id;
        let key = |kind| RollKey::new(attacker_id, kind, sequence);
        let penalty = if attacker.snapshot().unskilled {
            self.config.unskilled_hit_penalty_pct as f32 / 100.0
        } else {
            0.0
        };
        let hit_chance = final_hit_chance(
            self.config.base_hit_chance,
            attacker.snapshot().hit_delta,
            defender.snapshot().defense_delta,
            penalty,
        );
        let hit = check_hit(
            hit_chance,
            self.env.rng,
            self.env.roll_seed(key(RollKind::HitCheck)),
        );
        self.tracker
            .notify_hostile(attacker.id, self.now_ms, self.events);
        self.tracker
            .notify_hostile(defender.id, self.now_ms, self.events);

        // 4. miss
        if !hit {
            trace!(target: "combat::engine", attacker = %attacker.id, target = %defender.id, hit_chance, "miss");
            self.events.push(CombatEvent::Miss {
                attacker: attacker.id,
                target: defender.id,
                hit_chance,
            });
            return SwingOutcome::Missed;
        }

        // 5. damage
        let raw = self.env.rng.range(
            self.env.roll_seed(key(RollKind::DamageRoll)),
            weapon.min_damage,
            weapon.max_damage,
        );
        let amount = mitigate(
            increase(raw, attacker.snapshot().damage_increase),
            defender.snapshot().resist(weapon.damage_type),
        );
        let primary = apply_damage(
            DamagePacket {
                source: attacker.id,
                target: defender.id,
                raw,
                amount,
                damage_type: weapon.damage_type,
                origin: PacketOrigin::Weapon,
            },
            &mut defender.vitals.hp,
        );
        let mut landed: u16 = 1;
        let mut total_dealt = primary.dealt;
        let mut killing_blow = primary.lethal.then_some(primary);

        // procs: independent trials, payloads bypass cast requirements
        let procs = attacker.snapshot().procs.clone();
        let mut fired = 0u8;
        for (index, spell_id) in roll_procs(&procs, &self.env, attacker.id, sequence) {
            if !defender.is_alive() {
                break;
            }
            let Some(spell) = self.env.spells.spell(spell_id) else {
                warn!(target: "combat::engine", spell = %spell_id, "proc spell missing from catalog");
                continue;
            };
            let applied = self.land_spell(
                attacker.id,
                defender,
                &spell,
                PacketOrigin::Proc,
                key(RollKind::ProcDamage).indexed(index),
            );
            landed += 1;
            fired += 1;
            total_dealt += applied.dealt;
            if applied.lethal {
                killing_blow.get_or_insert(applied);
            }
            self.events.push(CombatEvent::ProcTriggered {
                attacker: attacker.id,
                target: defender.id,
                spell: spell_id,
                dealt: applied.dealt,
            });
        }

        // leach from final damage dealt, bounded by headroom
        for leach in &procs.leaches {
            let meter = attacker.vitals.get_mut(leach.vital);
            let restore = leach_amount(primary.dealt, leach.fraction, meter.headroom());
            if restore == 0 {
                continue;
            }
            let applied = apply_heal(
                HealPacket {
                    source: attacker.id,
                    target: attacker.id,
                    vital: leach.vital,
                    amount: restore,
                    origin: PacketOrigin::Leach,
                },
                meter,
            );
            self.events.push(CombatEvent::Healed {
                source: attacker.id,
                target: attacker.id,
                vital: leach.vital,
                amount: applied,
                origin: PacketOrigin::Leach,
            });
        }

        // durability: weapon per successful hit, armor per packet received
        if let Some(wear) = wear_weapon(&mut attacker.equipment, self.config.wear.weapon_per_hit) {
            self.record_wear(attacker, wear);
        }
        for index in 0..landed {
            self.wear_armor(defender, key(RollKind::ArmorSlot).indexed(index));
        }

        self.events.push(CombatEvent::Hit {
            attacker: attacker.id,
            target: defender.id,
            raw,
            amount,
            dealt: primary.dealt,
            damage_type: weapon.damage_type,
        });
        trace!(
            target: "combat::engine",
            attacker = %attacker.id,
            target = %defender.id,
            raw,
            amount,
            dealt = primary.dealt,
            "hit"
        );

        // 6. death check
        let killed = self.death_check(defender, killing_blow);

        SwingOutcome::Hit(HitReport {
            raw,
            amount,
            dealt: primary.dealt,
            procs: fired,
            total_dealt,
            killed,
        })
    }

    /// Lands a completed spell channel. Mana was paid when the cast started.
    pub fn resolve_spell(
        &mut self,
        caster: &mut ActorRecord,
        target: &mut ActorRecord,
        spell: &SpellDefinition,
    ) -> SpellOutcome {
        let range = spell.range.unwrap_or(self.config.spellcast.default_range);
        if let Err(reason) = self.revalidate(caster, target, range) {
            return SpellOutcome::Aborted(reason);
        }
        let sequence = caster.next_sequence();
        self.tracker.notify_hostile(caster.id, self.now_ms, self.events);
        let applied = self.land_spell(
            caster.id,
            target,
            spell,
            PacketOrigin::Spell,
            RollKey::new(caster.id, RollKind::SpellDamage, sequence),
        );
        self.wear_armor(target, RollKey::new(caster.id, RollKind::ArmorSlot, sequence));
        self.events.push(CombatEvent::CastCompleted {
            actor: caster.id,
            target: target.id,
            spell: spell.id,
            dealt: applied.dealt,
        });
        let killed = self.death_check(target, applied.lethal.then_some(applied));
        SpellOutcome::Landed {
            dealt: applied.dealt,
            killed,
        }
    }

    fn revalidate(
        &self,
        attacker: &ActorRecord,
        defender: &ActorRecord,
        range: f32,
    ) -> Result<(), AbortReason> {
        if !attacker.is_alive() || self.tracker.is_dead(attacker.id) {
            return Err(AbortReason::AttackerDead);
        }
        if !defender.is_alive() || self.tracker.is_dead(defender.id) {
            return Err(AbortReason::TargetDead);
        }
        if attacker.position.distance(defender.position) > range {
            return Err(AbortReason::OutOfRange);
        }
        let legality = self.env.legality.check(attacker.id, defender.id);
        if !legality.allowed || legality.target != defender.id {
            return Err(AbortReason::Illegal);
        }
        Ok(())
    }

    /// Spell payload: rolled damage mitigated by the target's resist for the
    /// spell's channel. No damage increase, no cast requirements.
    fn land_spell(
        &mut self,
        source: ActorId,
        target: &mut ActorRecord,
        spell: &SpellDefinition,
        origin: PacketOrigin,
        key: RollKey,
    ) -> AppliedDamage {
        let raw = self
            .env
            .rng
            .range(self.env.roll_seed(key), spell.min_damage, spell.max_damage);
        let amount = mitigate(raw as f32, target.snapshot().resist(spell.damage_type));
        let applied = apply_damage(
            DamagePacket {
                source,
                target: target.id,
                raw,
                amount,
                damage_type: spell.damage_type,
                origin,
            },
            &mut target.vitals.hp,
        );
        self.tracker.notify_hostile(target.id, self.now_ms, self.events);
        if let Some(status) = spell.status {
            self.events.push(CombatEvent::StatusRequested {
                source,
                target: target.id,
                status,
            });
        }
        applied
    }

    fn wear_armor(&mut self, target: &mut ActorRecord, key: RollKey) {
        let wear = wear_random_armor(
            &mut target.equipment,
            self.config.wear.armor_per_hit,
            self.env.rng,
            self.env.roll_seed(key),
        );
        if let Some(wear) = wear {
            self.record_wear(target, wear);
        }
    }

    fn record_wear(&mut self, owner: &mut ActorRecord, wear: Wear) {
        if !wear.broke {
            return;
        }
        debug!(target: "combat::engine", owner = %owner.id, item = %wear.item, slot = ?wear.slot, "item broke");
        owner.mark_dirty();
        self.events.push(CombatEvent::ItemBroken {
            owner: owner.id,
            slot: wear.slot,
            item: wear.item,
        });
    }

    fn death_check(&mut self, target: &ActorRecord, blow: Option<AppliedDamage>) -> bool {
        if target.is_alive() {
            return false;
        }
        let context = blow.map_or(
            KillContext {
                origin: PacketOrigin::Weapon,
                damage_type: target.snapshot().weapon.damage_type,
                at_ms: self.now_ms,
            },
            |b| KillContext {
                origin: b.origin,
                damage_type: b.damage_type,
                at_ms: self.now_ms,
            },
        );
        let killer = blow.map_or(target.id, |b| b.source);
        self.tracker
            .trigger_death(target.id, killer, context, self.events)
    }
}
