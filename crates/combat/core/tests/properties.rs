use combat_core::combat::{
    DamagePacket, apply_damage, final_hit_chance, leach_amount, mitigate,
};
use combat_core::stats::swing_time_ms;
use combat_core::{ActorId, DamageType, PacketOrigin, ResourceMeter};
use proptest::prelude::*;

proptest! {
    #[test]
    fn swing_time_never_drops_below_floor(
        base in 0u32..20_000,
        dex in -1.0f32..2.0,
        affix in -1.0f32..2.0,
        status in 0.0f32..8.0,
        floor in 0u32..3_000,
    ) {
        prop_assert!(swing_time_ms(base, dex, affix, status, floor) >= floor);
    }

    #[test]
    fn hit_chance_is_a_probability(
        base in -2.0f32..2.0,
        attacker in -2.0f32..2.0,
        defender in -2.0f32..2.0,
        penalty in 0.0f32..1.0,
    ) {
        let chance = final_hit_chance(base, attacker, defender, penalty);
        prop_assert!((0.0..=1.0).contains(&chance));
    }

    #[test]
    fn mitigation_never_amplifies(amount in 0u32..100_000, resist in -1.0f32..2.0) {
        prop_assert!(mitigate(amount as f32, resist) <= amount);
    }

    #[test]
    fn leach_is_bounded_by_headroom(
        dealt in 0u32..10_000,
        fraction in 0.0f32..1.5,
        headroom in 0u32..10_000,
    ) {
        let leached = leach_amount(dealt, fraction, headroom);
        prop_assert!(leached <= headroom);
        prop_assert!(leached <= dealt);
    }

    #[test]
    fn damage_is_lethal_exactly_once(hp in 1u32..500, hits in prop::collection::vec(0u32..200, 1..20)) {
        let mut meter = ResourceMeter::full(hp);
        let mut lethal = 0;
        let mut dealt = 0;
        for amount in hits {
            let applied = apply_damage(
                DamagePacket {
                    source: ActorId(1),
                    target: ActorId(2),
                    raw: amount,
                    amount,
                    damage_type: DamageType::Physical,
                    origin: PacketOrigin::Weapon,
                },
                &mut meter,
            );
            dealt += applied.dealt;
            lethal += u32::from(applied.lethal);
        }
        prop_assert!(dealt <= hp);
        prop_assert_eq!(lethal, u32::from(meter.is_empty()));
    }
}
