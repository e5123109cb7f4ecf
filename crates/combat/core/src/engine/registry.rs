use std::collections::BTreeMap;

use crate::state::{ActorId, ActorRecord};

/// Actor records keyed by id. Iteration order is id order.
#[derive(Clone, Debug, Default)]
pub struct ActorRegistry {
    actors: BTreeMap<ActorId, ActorRecord>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: ActorRecord) -> Option<ActorRecord> {
        self.actors.insert(record.id, record)
    }

    pub fn remove(&mut self, id: ActorId) -> Option<ActorRecord> {
        self.actors.remove(&id)
    }

    pub fn get(&self, id: ActorId) -> Option<&ActorRecord> {
        self.actors.get(&id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut ActorRecord> {
        self.actors.get_mut(&id)
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    pub fn ids(&self) -> Vec<ActorId> {
        self.actors.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorRecord> {
        self.actors.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActorRecord> {
        self.actors.values_mut()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Runs `f` with two distinct records borrowed mutably.
    ///
    /// Returns `None` if either id is missing or both ids are equal.
    pub fn with_pair_mut<R>(
        &mut self,
        first: ActorId,
        second: ActorId,
        f: impl FnOnce(&mut ActorRecord, &mut ActorRecord) -> R,
    ) -> Option<R> {
        if first == second || !self.actors.contains_key(&second) {
            return None;
        }
        let mut a = self.actors.remove(&first)?;
        let result = self.actors.get_mut(&second).map(|b| f(&mut a, b));
        self.actors.insert(first, a);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Position, Vitals};

    fn record(id: u32) -> ActorRecord {
        ActorRecord::new(ActorId(id), Position::ORIGIN, Vitals::full(10, 10, 10))
    }

    #[test]
    fn pair_borrow_round_trips_records() {
        let mut registry = ActorRegistry::new();
        registry.insert(record(1));
        registry.insert(record(2));

        let moved = registry.with_pair_mut(ActorId(1), ActorId(2), |a, b| {
            a.vitals.hp.drain(3);
            b.vitals.hp.drain(4);
            a.id.0 + b.id.0
        });
        assert_eq!(moved, Some(3));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(ActorId(1)).map(|r| r.vitals.hp.current), Some(7));
        assert_eq!(registry.get(ActorId(2)).map(|r| r.vitals.hp.current), Some(6));
    }

    #[test]
    fn pair_borrow_rejects_missing_or_same() {
        let mut registry = ActorRegistry::new();
        registry.insert(record(1));
        assert_eq!(registry.with_pair_mut(ActorId(1), ActorId(1), |_, _| ()), None);
        assert_eq!(registry.with_pair_mut(ActorId(1), ActorId(9), |_, _| ()), None);
        assert!(registry.contains(ActorId(1)));
    }
}
