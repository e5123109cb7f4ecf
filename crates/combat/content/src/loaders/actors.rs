//! Actor roster loader.
//!
//! Loads spawn records for players and monsters from RON files. Equipment is
//! checked against the catalog on load: unknown items are dropped, items in
//! the wrong slot are dropped, and affix lists are sanitized the same way the
//! engine sanitizes them on equip.
//!
//! Monster behavior is authored as overrides on the configured `[monster]`
//! defaults, so a roster only names what differs per monster.

use std::path::Path;

use combat_core::{
    ActorId, ActorRecord, AffixInstance, AffixList, Attributes, Backpack, BehaviorParams,
    CatalogSnapshot, Durability, EquipSlot, Equipment, ItemHandle, ItemInstance, ItemOracle,
    ModifierState, Position, SkillKind, Skills, Vitals, sanitize_item,
};
use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loaders::{LoadResult, read_file};

/// Authored item: a handle plus optional affixes and stack size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub handle: ItemHandle,
    #[serde(default = "one")]
    pub stack: u16,
    #[serde(default)]
    pub affixes: Vec<AffixInstance>,
}

fn one() -> u16 {
    1
}

/// Authored actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorSpec {
    pub id: u32,
    pub name: String,
    pub position: Position,
    /// Leash anchor; defaults to the spawn position.
    #[serde(default)]
    pub home: Option<Position>,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub skills: Vec<(SkillKind, u16)>,
    pub hp: u32,
    #[serde(default = "full_pool")]
    pub stamina: u32,
    #[serde(default = "full_pool")]
    pub mana: u32,
    #[serde(default)]
    pub equipment: Vec<(EquipSlot, ItemSpec)>,
    #[serde(default)]
    pub backpack: Vec<ItemSpec>,
    /// Present for monsters. Omitted fields take the configured defaults.
    #[serde(default)]
    pub behavior: Option<BehaviorOverrides>,
}

/// Per-monster tweaks layered on the configured [`BehaviorParams`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorOverrides {
    pub aggro_radius: Option<f32>,
    pub leash_radius: Option<f32>,
    pub preferred_range: Option<f32>,
    pub range_tolerance: Option<f32>,
    pub flee_at_hp_pct: Option<f32>,
    pub flee_distance: Option<f32>,
    pub reengage_hp_pct: Option<f32>,
    pub regen_per_sec: Option<f32>,
    pub move_speed: Option<f32>,
    pub scan_interval_ms: Option<u32>,
}

impl BehaviorOverrides {
    pub fn apply(&self, defaults: &BehaviorParams) -> BehaviorParams {
        BehaviorParams {
            aggro_radius: self.aggro_radius.unwrap_or(defaults.aggro_radius),
            leash_radius: self.leash_radius.unwrap_or(defaults.leash_radius),
            preferred_range: self.preferred_range.unwrap_or(defaults.preferred_range),
            range_tolerance: self.range_tolerance.unwrap_or(defaults.range_tolerance),
            flee_at_hp_pct: self.flee_at_hp_pct.unwrap_or(defaults.flee_at_hp_pct),
            flee_distance: self.flee_distance.unwrap_or(defaults.flee_distance),
            reengage_hp_pct: self.reengage_hp_pct.unwrap_or(defaults.reengage_hp_pct),
            regen_per_sec: self.regen_per_sec.unwrap_or(defaults.regen_per_sec),
            move_speed: self.move_speed.unwrap_or(defaults.move_speed),
            scan_interval_ms: self.scan_interval_ms.unwrap_or(defaults.scan_interval_ms),
        }
    }
}

fn full_pool() -> u32 {
    100
}

/// An actor ready for `on_spawn` / `on_spawn_monster`.
#[derive(Debug, Clone)]
pub struct LoadedActor {
    pub name: String,
    pub record: ActorRecord,
    pub behavior: Option<BehaviorParams>,
}

impl LoadedActor {
    pub fn id(&self) -> ActorId {
        self.record.id
    }

    pub fn is_monster(&self) -> bool {
        self.behavior.is_some()
    }
}

/// Loader for actor rosters from RON files.
pub struct ActorLoader;

impl ActorLoader {
    /// Load a roster. RON format: `Vec<ActorSpec>`, with bare values accepted
    /// for optional behavior fields.
    pub fn load(
        path: &Path,
        catalog: &CatalogSnapshot,
        defaults: &BehaviorParams,
    ) -> LoadResult<Vec<LoadedActor>> {
        let content = read_file(path)?;
        let specs: Vec<ActorSpec> = ron::Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse actor roster RON: {}", e))?;
        Self::build(specs, catalog, defaults)
    }

    /// Turns specs into spawn-ready records. Actor ids must be unique.
    pub fn build(
        specs: Vec<ActorSpec>,
        catalog: &CatalogSnapshot,
        defaults: &BehaviorParams,
    ) -> LoadResult<Vec<LoadedActor>> {
        let mut seen = std::collections::BTreeSet::new();
        let mut actors = Vec::with_capacity(specs.len());
        for spec in specs {
            if !seen.insert(spec.id) {
                anyhow::bail!("duplicate actor id {} ('{}')", spec.id, spec.name);
            }
            actors.push(Self::build_one(spec, catalog, defaults));
        }
        Ok(actors)
    }

    fn build_one(
        spec: ActorSpec,
        catalog: &CatalogSnapshot,
        defaults: &BehaviorParams,
    ) -> LoadedActor {
        let id = ActorId(spec.id);

        let mut skills = Skills::default();
        for (skill, value) in &spec.skills {
            skills.set(*skill, *value);
        }

        let mut equipment = Equipment::empty();
        for (slot, item) in &spec.equipment {
            let Some(definition) = catalog.definition(item.handle) else {
                warn!(target: "content::actors", actor = %spec.name, item = %item.handle, "unknown item dropped");
                continue;
            };
            if definition.slot != Some(*slot) {
                warn!(target: "content::actors", actor = %spec.name, item = %item.handle, ?slot, "item in wrong slot dropped");
                continue;
            }
            let mut instance = instantiate(item);
            instance.durability = definition.max_durability.map(Durability::new);
            let report = sanitize_item(&mut instance, catalog);
            if !report.is_clean() {
                warn!(target: "content::actors", actor = %spec.name, item = %item.handle, ?report, "affixes sanitized");
            }
            if let Some(previous) = equipment.equip(*slot, instance) {
                warn!(target: "content::actors", actor = %spec.name, item = %previous.handle, ?slot, "slot listed twice; earlier item dropped");
            }
        }

        let mut backpack = Backpack::new();
        for item in &spec.backpack {
            if catalog.definition(item.handle).is_none() {
                warn!(target: "content::actors", actor = %spec.name, item = %item.handle, "unknown backpack item dropped");
                continue;
            }
            backpack.add(instantiate(item));
        }

        let mut record = ActorRecord::new(
            id,
            spec.position,
            Vitals::full(spec.hp, spec.stamina, spec.mana),
        )
        .with_attributes(spec.attributes)
        .with_skills(skills)
        .with_equipment(equipment)
        .with_backpack(backpack);
        record.home = spec.home.unwrap_or(spec.position);

        LoadedActor {
            name: spec.name,
            record,
            behavior: spec.behavior.map(|overrides| overrides.apply(defaults)),
        }
    }
}

fn instantiate(item: &ItemSpec) -> ItemInstance {
    let affixes: AffixList = item
        .affixes
        .iter()
        .take(combat_core::CombatConfig::MAX_AFFIXES)
        .copied()
        .collect();
    let state = ModifierState::for_count(affixes.len());
    ItemInstance::stack_of(item.handle, item.stack.max(1)).with_affixes(affixes, state)
}
