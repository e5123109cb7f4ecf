use std::time::Duration;

use combat_core::{
    ActorId, ActorRecord, AllowAll, Attributes, CatalogSnapshot, CombatError, CombatEvent,
    CombatState, EquipSlot, Equipment, ItemDefinition, ItemHandle, ItemInstance, Oracles,
    Position, Vitals, WeaponData,
};
use combat_runtime::{Runtime, RuntimeError, RuntimeEvent, TickMode};
use tokio::sync::broadcast;

const SWORD: ItemHandle = ItemHandle(1);

fn oracles() -> Oracles {
    let catalog = CatalogSnapshot::new().with_item(ItemDefinition::weapon(
        SWORD,
        WeaponData::melee(5, 10, 2000, 10),
    ));
    Oracles::from_catalog(catalog, AllowAll, 7)
}

fn swordsman(id: u32, x: f32) -> ActorRecord {
    let mut equipment = Equipment::empty();
    equipment.equip(EquipSlot::Weapon, ItemInstance::new(SWORD));
    ActorRecord::new(ActorId(id), Position::new(x, 0.0), Vitals::full(500, 100, 50))
        .with_attributes(Attributes::new(50, 0, 50))
        .with_equipment(equipment)
}

fn manual_runtime() -> Runtime {
    Runtime::builder()
        .oracles(oracles())
        .spawn(swordsman(1, 0.0))
        .spawn(swordsman(2, 1.0))
        .build()
        .expect("runtime should build")
}

fn drain(rx: &mut broadcast::Receiver<RuntimeEvent>) -> Vec<RuntimeEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test]
async fn first_swing_is_published_at_its_tick() {
    let runtime = manual_runtime();
    let handle = runtime.handle();
    let mut rx = handle.subscribe_events();

    handle.arm_attack(ActorId(1), ActorId(2)).await.unwrap();
    let armed = drain(&mut rx);
    assert!(armed.iter().any(|e| matches!(
        e.event,
        CombatEvent::AttackArmed { attacker: ActorId(1), target: ActorId(2) }
    )));

    let tick = handle.advance(19).await.unwrap();
    assert_eq!(tick.0, 19);
    assert!(
        drain(&mut rx)
            .iter()
            .all(|e| !matches!(e.event, CombatEvent::Hit { .. } | CombatEvent::Miss { .. }))
    );

    handle.step().await.unwrap();
    let swing = drain(&mut rx)
        .into_iter()
        .find(|e| matches!(e.event, CombatEvent::Hit { .. } | CombatEvent::Miss { .. }))
        .expect("swing resolves on tick 20");
    assert_eq!(swing.tick.0, 20);
    assert_eq!(swing.now_ms, 2000);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn query_reflects_engine_state() {
    let runtime = manual_runtime();
    let handle = runtime.handle();

    handle.arm_attack(ActorId(1), ActorId(2)).await.unwrap();
    handle.advance(20).await.unwrap();

    let view = handle
        .query_actor(ActorId(1))
        .await
        .unwrap()
        .expect("actor is spawned");
    assert_eq!(view.state, CombatState::InCombat);
    assert_eq!(view.session.map(|s| s.target), Some(ActorId(2)));
    assert_eq!(view.record.vitals.stamina.current, 90);
    assert!(view.monster.is_none());
    assert!(view.is_alive());

    assert!(handle.query_actor(ActorId(99)).await.unwrap().is_none());
    assert_eq!(handle.query_clock().await.unwrap(), (combat_core::Tick(20), 2000));

    let mut ids = handle.query_actors().await.unwrap();
    ids.sort();
    assert_eq!(ids, vec![ActorId(1), ActorId(2)]);
}

#[tokio::test]
async fn engine_errors_surface_through_the_handle() {
    let runtime = manual_runtime();
    let handle = runtime.handle();

    let err = handle.arm_attack(ActorId(1), ActorId(1)).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Combat(CombatError::SelfTarget(ActorId(1)))
    ));

    let err = handle.spawn(swordsman(2, 3.0)).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Combat(CombatError::AlreadySpawned(ActorId(2)))
    ));
}

#[tokio::test]
async fn despawn_cancels_and_removes() {
    let runtime = manual_runtime();
    let handle = runtime.handle();
    let mut rx = handle.subscribe_events();

    handle.arm_attack(ActorId(1), ActorId(2)).await.unwrap();
    let record = handle.despawn(ActorId(2)).await.unwrap();
    assert_eq!(record.id, ActorId(2));

    let events = drain(&mut rx);
    assert!(events.iter().any(|e| matches!(
        e.event,
        CombatEvent::AttackCancelled { attacker: ActorId(1), .. }
    )));
    assert!(events.iter().all(|e| !matches!(e.event, CombatEvent::ActorKilled { .. })));
    assert!(handle.query_actor(ActorId(2)).await.unwrap().is_none());
}

#[tokio::test]
async fn building_requires_oracles_and_a_real_interval() {
    let missing = Runtime::builder().build().err();
    assert!(matches!(missing, Some(RuntimeError::MissingOracles)));

    let zero = Runtime::builder()
        .oracles(oracles())
        .tick_mode(TickMode::RealTime {
            interval: Duration::ZERO,
        })
        .build()
        .err();
    assert!(matches!(zero, Some(RuntimeError::ZeroTickInterval)));
}

#[tokio::test(start_paused = true)]
async fn real_time_mode_ticks_on_its_own() {
    let runtime = Runtime::builder()
        .oracles(oracles())
        .tick_mode(TickMode::RealTime {
            interval: Duration::from_millis(100),
        })
        .spawn(swordsman(1, 0.0))
        .spawn(swordsman(2, 1.0))
        .build()
        .unwrap();
    let handle = runtime.handle();

    handle.arm_attack(ActorId(1), ActorId(2)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2_050)).await;

    let (tick, now_ms) = handle.query_clock().await.unwrap();
    assert!(tick.0 >= 20, "only reached tick {tick}");
    assert_eq!(now_ms, tick.0 * 100);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn event_stream_closes_on_shutdown() {
    let runtime = manual_runtime();
    let mut rx = runtime.subscribe_events();
    runtime.shutdown().await.unwrap();

    assert!(matches!(
        rx.recv().await,
        Err(broadcast::error::RecvError::Closed)
    ));
}
