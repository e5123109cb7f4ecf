mod common;

use combat_core::{
    ActorId, ArmOutcome, CancelReason, CombatError, CombatEvent, CombatState, PacketOrigin,
    Position,
};

use common::{AXE, armed, engine, fighter, kills, sure_hit};

const A: ActorId = ActorId(1);
const B: ActorId = ActorId(2);
const VICTIM: ActorId = ActorId(3);

fn two_on_one() -> combat_core::CombatEngine {
    let mut engine = engine();
    engine
        .on_spawn(armed(1, Position::new(-1.0, 0.0), 100, AXE).with_statuses(vec![sure_hit()]))
        .unwrap();
    engine
        .on_spawn(armed(2, Position::new(1.0, 0.0), 100, AXE).with_statuses(vec![sure_hit()]))
        .unwrap();
    engine.on_spawn(fighter(3, Position::ORIGIN, 10)).unwrap();
    engine.arm_attack(A, VICTIM).unwrap();
    engine.arm_attack(B, VICTIM).unwrap();
    engine.drain_events();
    engine
}

#[test]
fn simultaneous_killing_blows_emit_one_death() {
    let mut engine = two_on_one();
    engine.advance(20);
    let events = engine.drain_events();

    assert_eq!(kills(&events), vec![(A, VICTIM)]);
    assert_eq!(engine.state(VICTIM), CombatState::Dead);
    assert!(events.contains(&CombatEvent::AttackCancelled {
        attacker: B,
        target: VICTIM,
        reason: CancelReason::Death,
    }));
    // B's swing never resolved
    let hits = events
        .iter()
        .filter(|e| matches!(e, CombatEvent::Hit { attacker, .. } if *attacker == B))
        .count();
    assert_eq!(hits, 0);
    assert!(engine.session(A).is_none());
    assert!(engine.session(B).is_none());
}

#[test]
fn kill_context_names_the_weapon_blow() {
    let mut engine = two_on_one();
    engine.advance(20);
    let context = engine
        .drain_events()
        .into_iter()
        .find_map(|e| match e {
            CombatEvent::ActorKilled { context, .. } => Some(context),
            _ => None,
        })
        .unwrap();
    assert_eq!(context.origin, PacketOrigin::Weapon);
    assert_eq!(context.at_ms, 2000);
}

#[test]
fn dead_actors_are_refused_until_revived() {
    let mut engine = two_on_one();
    engine.advance(20);
    engine.drain_events();

    assert_eq!(engine.arm_attack(A, VICTIM).unwrap(), ArmOutcome::Refused);
    assert_eq!(engine.arm_attack(VICTIM, A).unwrap(), ArmOutcome::Refused);

    // more ticks never produce a second death
    engine.advance(50);
    assert!(kills(&engine.drain_events()).is_empty());

    assert!(engine.revive(VICTIM, 40).unwrap());
    assert!(!engine.revive(VICTIM, 40).unwrap());
    assert_eq!(engine.state(VICTIM), CombatState::Peaceful);
    assert_eq!(engine.actor(VICTIM).unwrap().vitals.hp.current, 40);
    assert_eq!(engine.arm_attack(A, VICTIM).unwrap(), ArmOutcome::Armed);
}

#[test]
fn despawn_ends_sessions_without_a_kill() {
    let mut engine = two_on_one();
    engine.advance(5);
    let record = engine.on_despawn(VICTIM).unwrap();
    assert_eq!(record.id, VICTIM);

    let events = engine.drain_events();
    assert!(kills(&events).is_empty());
    let despawned = events
        .iter()
        .filter(|e| {
            matches!(
                e,
                CombatEvent::AttackCancelled {
                    reason: CancelReason::Despawn,
                    ..
                }
            )
        })
        .count();
    assert_eq!(despawned, 2);
    assert_eq!(
        engine.on_despawn(VICTIM).unwrap_err(),
        CombatError::ActorNotFound(VICTIM)
    );
}

#[test]
fn self_target_and_double_spawn_are_errors() {
    let mut engine = two_on_one();
    assert_eq!(
        engine.arm_attack(A, A).unwrap_err(),
        CombatError::SelfTarget(A)
    );
    assert_eq!(
        engine.on_spawn(fighter(1, Position::ORIGIN, 5)).unwrap_err(),
        CombatError::AlreadySpawned(A)
    );
}
