//! Load-time integrity checks for rolled affix lists.

use tracing::warn;

use crate::config::CombatConfig;
use crate::env::AffixOracle;
use crate::state::{AffixId, AffixInstance, AffixList, ItemInstance, ModifierState};

/// What sanitization changed. Empty when the input was already valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    pub unknown: Vec<AffixId>,
    pub clamped: Vec<AffixId>,
    pub truncated: usize,
}

impl SanitizeReport {
    pub fn is_clean(&self) -> bool {
        self.unknown.is_empty() && self.clamped.is_empty() && self.truncated == 0
    }
}

/// A sanitized affix list ready to attach to an instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sanitized {
    pub affixes: AffixList,
    pub report: SanitizeReport,
}

/// Strips unknown ids, clamps magnitudes to the catalog range and truncates
/// past the global cap, in that order.
pub fn sanitize_affixes(raw: &[AffixInstance], catalog: &dyn AffixOracle) -> Sanitized {
    let mut report = SanitizeReport::default();
    let mut affixes = AffixList::new();

    for instance in raw {
        let Some(definition) = catalog.affix(instance.id) else {
            report.unknown.push(instance.id);
            continue;
        };
        let magnitude = definition.clamp(instance.magnitude);
        if magnitude != instance.magnitude {
            report.clamped.push(instance.id);
        }
        if affixes.len() == CombatConfig::MAX_AFFIXES {
            report.truncated += 1;
            continue;
        }
        affixes.push(AffixInstance::new(instance.id, magnitude));
    }

    Sanitized { affixes, report }
}

/// Sanitizes an instance in place and logs anything that was repaired.
pub fn sanitize_item(item: &mut ItemInstance, catalog: &dyn AffixOracle) -> SanitizeReport {
    let Sanitized { affixes, report } = sanitize_affixes(&item.affixes, catalog);
    if !report.is_clean() {
        warn!(
            target: "combat::affix",
            item = %item.handle,
            unknown = ?report.unknown,
            clamped = ?report.clamped,
            "sanitized affix list"
        );
    }
    if affixes.is_empty() && item.modifier_state == ModifierState::Magical {
        item.modifier_state = ModifierState::NoBonusModifiers;
    }
    item.affixes = affixes;
    report
}
