//! Affix resolution: count rolls, sanitization and stacking-aware aggregation.
mod aggregate;
mod count;
mod roll;
mod sanitize;

pub use aggregate::{AffixResolver, AffixTotals};
pub use count::{AffixContext, AffixCount, AffixCountTable, RarityTier, SkillStep, resolve_count};
pub use roll::{RolledAffixes, roll_affixes};
pub use sanitize::{SanitizeReport, Sanitized, sanitize_affixes, sanitize_item};
