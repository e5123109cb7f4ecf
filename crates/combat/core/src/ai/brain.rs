//! Monster decision state machine.

use tracing::debug;

use super::BehaviorParams;
use crate::engine::ArmOutcome;
use crate::state::{ActorId, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MonsterState {
    #[default]
    Idle,
    Chase,
    Attack,
    Flee,
    Recover,
}

/// Capabilities the decision loop may use.
///
/// Implemented by the composition root over the shared request API; the loop
/// has no other way to affect the world.
pub trait BrainContext {
    fn me(&self) -> ActorId;

    fn tick_ms(&self) -> u32;

    fn position_of(&self, actor: ActorId) -> Option<Position>;

    /// Spawn point the leash is measured from.
    fn home(&self) -> Position;

    /// Registered, alive and attackable.
    fn is_valid_target(&self, actor: ActorId) -> bool;

    fn health_ratio(&self) -> f32;

    /// Eligible targets within `radius` of `center`, in scan order.
    fn scan(&self, center: Position, radius: f32) -> Vec<(ActorId, Position)>;

    fn has_session(&self) -> bool;

    fn arm_attack(&mut self, target: ActorId) -> ArmOutcome;

    fn cancel_attack(&mut self);

    /// Requests a move to `destination`. Returns `false` when refused.
    fn move_to(&mut self, destination: Position) -> bool;

    fn regenerate(&mut self, amount: u32);
}

/// Idle/Chase/Attack/Flee/Recover state machine for one monster.
///
/// Never resolves damage: it arms and cancels the shared attack session and
/// issues movement requests, nothing else.
#[derive(Clone, Debug, PartialEq)]
pub struct MonsterBrain {
    params: BehaviorParams,
    state: MonsterState,
    target: Option<ActorId>,
    scan_cooldown_ms: u32,
    /// Sub-integer regeneration carried between ticks.
    regen_carry: f32,
    pending_arm: bool,
}

impl MonsterBrain {
    pub fn new(params: BehaviorParams) -> Self {
        Self {
            params,
            state: MonsterState::Idle,
            target: None,
            scan_cooldown_ms: 0,
            regen_carry: 0.0,
            pending_arm: false,
        }
    }

    pub fn state(&self) -> MonsterState {
        self.state
    }

    pub fn target(&self) -> Option<ActorId> {
        self.target
    }

    pub fn params(&self) -> &BehaviorParams {
        &self.params
    }

    /// Advances the loop by one step.
    pub fn tick(&mut self, ctx: &mut impl BrainContext) {
        if !matches!(self.state, MonsterState::Flee | MonsterState::Recover)
            && ctx.health_ratio() <= self.params.flee_at_hp_pct
        {
            ctx.cancel_attack();
            self.enter(ctx.me(), MonsterState::Flee);
        }

        match self.state {
            MonsterState::Idle => self.idle(ctx),
            MonsterState::Chase => self.chase(ctx),
            MonsterState::Attack => self.attack(ctx),
            MonsterState::Flee => self.flee(ctx),
            MonsterState::Recover => self.recover(ctx),
        }
    }

    fn enter(&mut self, me: ActorId, next: MonsterState) {
        if self.state != next {
            debug!(target: "combat::ai", monster = %me, from = ?self.state, to = ?next, "behavior changed");
            self.state = next;
        }
        if next == MonsterState::Attack {
            self.pending_arm = true;
        }
    }

    fn give_up(&mut self, ctx: &mut impl BrainContext) {
        ctx.cancel_attack();
        self.target = None;
        self.enter(ctx.me(), MonsterState::Idle);
    }

    fn step(&self, ctx: &impl BrainContext) -> f32 {
        self.params.move_speed * ctx.tick_ms() as f32 / 1000.0
    }

    fn leashed(&self, ctx: &impl BrainContext, me: Position) -> bool {
        me.distance(ctx.home()) > self.params.leash_radius
    }

    fn idle(&mut self, ctx: &mut impl BrainContext) {
        self.scan_cooldown_ms = self.scan_cooldown_ms.saturating_sub(ctx.tick_ms());
        if self.scan_cooldown_ms > 0 {
            return;
        }
        self.scan_cooldown_ms = self.params.scan_interval_ms;

        let Some(me) = ctx.position_of(ctx.me()) else {
            return;
        };
        // Nearest first; `min_by` keeps the earliest on ties, which is scan order.
        let nearest = ctx
            .scan(me, self.params.aggro_radius)
            .into_iter()
            .filter(|(id, _)| *id != ctx.me())
            .min_by(|(_, a), (_, b)| me.distance(*a).total_cmp(&me.distance(*b)));
        if let Some((target, _)) = nearest {
            self.target = Some(target);
            self.enter(ctx.me(), MonsterState::Chase);
        }
    }

    fn chase(&mut self, ctx: &mut impl BrainContext) {
        let Some((me, them)) = self.positions(&*ctx) else {
            return self.give_up(ctx);
        };
        if self.leashed(&*ctx, me) {
            return self.give_up(ctx);
        }
        if me.distance(them) <= self.params.band_max() {
            self.enter(ctx.me(), MonsterState::Attack);
            return self.attack(ctx);
        }
        let step = self.step(&*ctx);
        ctx.move_to(me.step_toward(them, step));
    }

    fn attack(&mut self, ctx: &mut impl BrainContext) {
        let Some((me, them)) = self.positions(&*ctx) else {
            return self.give_up(ctx);
        };
        if self.leashed(&*ctx, me) {
            return self.give_up(ctx);
        }
        let distance = me.distance(them);
        if distance > self.params.chase_threshold() {
            self.enter(ctx.me(), MonsterState::Chase);
            return;
        }

        if (self.pending_arm || !ctx.has_session())
            && let Some(target) = self.target
        {
            match ctx.arm_attack(target) {
                ArmOutcome::Refused => return self.give_up(ctx),
                _ => self.pending_arm = false,
            }
        }

        let step = self.step(&*ctx);
        if distance < self.params.band_min() {
            ctx.move_to(me.step_away(them, step.min(self.params.band_min() - distance)));
        } else if distance > self.params.band_max() {
            ctx.move_to(me.step_toward(them, step.min(distance - self.params.preferred_range)));
        }
    }

    fn flee(&mut self, ctx: &mut impl BrainContext) {
        let me = ctx.position_of(ctx.me());
        let threat = self.target.and_then(|t| ctx.position_of(t));
        match (me, threat) {
            (Some(me), Some(threat)) if me.distance(threat) < self.params.flee_distance => {
                let step = self.step(&*ctx);
                ctx.move_to(me.step_away(threat, step));
            }
            _ => {
                self.regen_carry = 0.0;
                self.enter(ctx.me(), MonsterState::Recover);
            }
        }
    }

    fn recover(&mut self, ctx: &mut impl BrainContext) {
        self.regen_carry += self.params.regen_per_sec * ctx.tick_ms() as f32 / 1000.0;
        let whole = self.regen_carry.floor();
        if whole >= 1.0 {
            self.regen_carry -= whole;
            ctx.regenerate(whole as u32);
        }

        if ctx.health_ratio() < self.params.reengage_hp_pct {
            return;
        }
        match self.target {
            Some(target) if ctx.is_valid_target(target) => {
                self.enter(ctx.me(), MonsterState::Chase)
            }
            _ => {
                self.target = None;
                self.enter(ctx.me(), MonsterState::Idle);
            }
        }
    }

    /// Own position and the target's, if the target is still valid.
    fn positions(&self, ctx: &impl BrainContext) -> Option<(Position, Position)> {
        let target = self.target.filter(|t| ctx.is_valid_target(*t))?;
        Some((ctx.position_of(ctx.me())?, ctx.position_of(target)?))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    const ME: ActorId = ActorId(10);
    const HERO: ActorId = ActorId(1);

    struct Fake {
        positions: BTreeMap<ActorId, Position>,
        hp: u32,
        max_hp: u32,
        session: Option<ActorId>,
        arms: u32,
        cancels: u32,
        valid: bool,
    }

    impl Fake {
        fn new(hero_at: Position) -> Self {
            let mut positions = BTreeMap::new();
            positions.insert(ME, Position::ORIGIN);
            positions.insert(HERO, hero_at);
            Self {
                positions,
                hp: 100,
                max_hp: 100,
                session: None,
                arms: 0,
                cancels: 0,
                valid: true,
            }
        }
    }

    impl BrainContext for Fake {
        fn me(&self) -> ActorId {
            ME
        }
        fn tick_ms(&self) -> u32 {
            100
        }
        fn position_of(&self, actor: ActorId) -> Option<Position> {
            self.positions.get(&actor).copied()
        }
        fn home(&self) -> Position {
            Position::ORIGIN
        }
        fn is_valid_target(&self, _actor: ActorId) -> bool {
            self.valid
        }
        fn health_ratio(&self) -> f32 {
            self.hp as f32 / self.max_hp as f32
        }
        fn scan(&self, center: Position, radius: f32) -> Vec<(ActorId, Position)> {
            self.positions
                .iter()
                .filter(|(id, p)| **id != ME && self.valid && center.distance(**p) <= radius)
                .map(|(id, p)| (*id, *p))
                .collect()
        }
        fn has_session(&self) -> bool {
            self.session.is_some()
        }
        fn arm_attack(&mut self, target: ActorId) -> ArmOutcome {
            self.arms += 1;
            self.session = Some(target);
            ArmOutcome::Armed
        }
        fn cancel_attack(&mut self) {
            self.cancels += 1;
            self.session = None;
        }
        fn move_to(&mut self, destination: Position) -> bool {
            self.positions.insert(ME, destination);
            true
        }
        fn regenerate(&mut self, amount: u32) {
            self.hp = (self.hp + amount).min(self.max_hp);
        }
    }

    #[test]
    fn acquires_chases_and_arms_once() {
        let mut ctx = Fake::new(Position::new(3.0, 0.0));
        let mut brain = MonsterBrain::new(BehaviorParams::default());

        brain.tick(&mut ctx);
        assert_eq!(brain.state(), MonsterState::Chase);
        assert_eq!(brain.target(), Some(HERO));

        for _ in 0..20 {
            brain.tick(&mut ctx);
        }
        assert_eq!(brain.state(), MonsterState::Attack);
        assert_eq!(ctx.arms, 1);
        let distance = ctx.positions[&ME].distance(ctx.positions[&HERO]);
        assert!(distance <= BehaviorParams::default().band_max() + 1e-4);
    }

    #[test]
    fn low_health_flees_regardless_of_target() {
        let mut ctx = Fake::new(Position::new(1.0, 0.0));
        let mut brain = MonsterBrain::new(BehaviorParams::default());
        brain.tick(&mut ctx);
        brain.tick(&mut ctx);
        assert_eq!(brain.state(), MonsterState::Attack);

        ctx.hp = 20;
        ctx.valid = false;
        brain.tick(&mut ctx);
        assert_eq!(brain.state(), MonsterState::Flee);
        assert!(ctx.session.is_none());
    }

    #[test]
    fn recover_accumulates_fractional_regen() {
        let params = BehaviorParams {
            regen_per_sec: 2.5,
            flee_distance: 0.5,
            ..BehaviorParams::default()
        };
        let mut ctx = Fake::new(Position::new(1.0, 0.0));
        let mut brain = MonsterBrain::new(params);
        brain.tick(&mut ctx);
        ctx.hp = 20;
        brain.tick(&mut ctx);
        brain.tick(&mut ctx);
        assert_eq!(brain.state(), MonsterState::Recover);

        // 2.5 HP/s at 100 ms per tick: 10 ticks restore exactly 2 or 3 HP,
        // never rounding loss over a full second.
        let before = ctx.hp;
        for _ in 0..10 {
            brain.tick(&mut ctx);
        }
        assert!((2..=3).contains(&(ctx.hp - before)));
        for _ in 0..10 {
            brain.tick(&mut ctx);
        }
        assert_eq!(ctx.hp - before, 5);
    }

    #[test]
    fn leash_gives_up_chase() {
        let params = BehaviorParams {
            leash_radius: 1.0,
            aggro_radius: 50.0,
            ..BehaviorParams::default()
        };
        let mut ctx = Fake::new(Position::new(30.0, 0.0));
        let mut brain = MonsterBrain::new(params);
        for _ in 0..10 {
            brain.tick(&mut ctx);
            if brain.state() == MonsterState::Idle && brain.target().is_none() && ctx.positions[&ME] != Position::ORIGIN {
                break;
            }
        }
        assert!(ctx.positions[&ME].distance(Position::ORIGIN) <= 1.0 + 0.4 + 1e-4);
        assert_eq!(brain.target(), None);
    }
}
