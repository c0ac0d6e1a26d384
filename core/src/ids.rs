use std::ops::Range;

use rustc_hash::FxHashMap;

/// Node identifier as stored by the backing graph (sparse, opaque).
pub type ExternalId = u64;

/// Dense node index in `[0, node_count)`. Every per-node array is addressed by it.
pub type MappedId = u32;

/// Bijective translation between sparse external ids and dense mapped ids.
///
/// Mapped ids are handed out by a monotonically increasing counter. The
/// backward (mapped → external) array is only valid after [`IdMap::finalize`].
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    forward: FxHashMap<ExternalId, MappedId>,
    backward: Vec<ExternalId>,
    next_id: MappedId,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for `capacity` nodes so loading never rehashes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            forward: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            backward: Vec::new(),
            next_id: 0,
        }
    }

    /// Return the mapped id for `external`, assigning the next one if unseen.
    pub fn map_or_get(&mut self, external: ExternalId) -> MappedId {
        if let Some(&mapped) = self.forward.get(&external) {
            return mapped;
        }
        self.assign_next(external)
    }

    /// Assign the next mapped id without checking for an existing entry.
    ///
    /// Callers must guarantee `external` has not been inserted before.
    pub fn assign_next(&mut self, external: ExternalId) -> MappedId {
        let mapped = self.next_id;
        self.next_id = self
            .next_id
            .checked_add(1)
            .expect("IdMap exceeded u32::MAX mapped ids");
        let previous = self.forward.insert(external, mapped);
        debug_assert!(
            previous.is_none(),
            "external id {} assigned twice",
            external
        );
        mapped
    }

    pub fn lookup(&self, external: ExternalId) -> Option<MappedId> {
        self.forward.get(&external).copied()
    }

    /// Build the backward array from the forward index.
    ///
    /// Calling this again recomputes the array from the current forward state.
    pub fn finalize(&mut self) {
        let mut backward = vec![0; self.next_id as usize];
        for (&external, &mapped) in &self.forward {
            backward[mapped as usize] = external;
        }
        self.backward = backward;
    }

    /// Panics if `mapped` is out of range or the map was never finalized.
    #[inline]
    pub fn to_external(&self, mapped: MappedId) -> ExternalId {
        self.backward[mapped as usize]
    }

    /// Number of mapped ids allocated so far.
    pub fn size(&self) -> usize {
        self.next_id as usize
    }

    /// Number of nodes covered by the finalized backward array.
    pub fn node_count(&self) -> usize {
        self.backward.len()
    }

    pub fn is_finalized(&self) -> bool {
        self.backward.len() == self.next_id as usize
    }

    /// Every mapped id in `[0, node_count)`, ascending.
    pub fn nodes(&self) -> Range<MappedId> {
        0..self.backward.len() as MappedId
    }

    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let forward = self.forward.capacity() * (size_of::<ExternalId>() + size_of::<MappedId>() + 1);
        let backward = self.backward.capacity() * size_of::<ExternalId>();
        forward + backward
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_or_get_is_idempotent() {
        let mut ids = IdMap::with_capacity(4);
        let a = ids.map_or_get(9_000);
        let b = ids.map_or_get(17);
        assert_eq!(ids.map_or_get(9_000), a);
        assert_eq!(ids.map_or_get(17), b);
        assert_eq!(ids.size(), 2);
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut ids = IdMap::new();
        assert_eq!(ids.map_or_get(500), 0);
        assert_eq!(ids.assign_next(42), 1);
        assert_eq!(ids.map_or_get(7), 2);
        assert_eq!(ids.map_or_get(500), 0);
    }

    #[test]
    fn test_round_trip_after_finalize() {
        let externals = [u64::MAX, 0, 31, 1 << 40, 12];
        let mut ids = IdMap::with_capacity(externals.len());
        let mapped: Vec<MappedId> = externals.iter().map(|&e| ids.map_or_get(e)).collect();
        ids.finalize();

        for (&external, &m) in externals.iter().zip(&mapped) {
            assert_eq!(ids.to_external(m), external);
            assert_eq!(ids.map_or_get(external), m);
        }
        assert_eq!(ids.node_count(), externals.len());
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let mut ids = IdMap::new();
        ids.map_or_get(3);
        assert_eq!(ids.lookup(3), Some(0));
        assert_eq!(ids.lookup(4), None);
        // lookup never allocates
        assert_eq!(ids.size(), 1);
    }

    #[test]
    fn test_finalize_twice_is_harmless() {
        let mut ids = IdMap::new();
        ids.map_or_get(10);
        ids.finalize();
        ids.map_or_get(20);
        assert!(!ids.is_finalized());
        ids.finalize();
        assert!(ids.is_finalized());
        assert_eq!(ids.to_external(0), 10);
        assert_eq!(ids.to_external(1), 20);
    }

    #[test]
    fn test_nodes_enumerates_each_id_once() {
        let mut ids = IdMap::new();
        for e in [5, 3, 5, 8, 3] {
            ids.map_or_get(e);
        }
        ids.finalize();
        let nodes: Vec<MappedId> = ids.nodes().collect();
        assert_eq!(nodes, vec![0, 1, 2]);
    }

    #[test]
    #[should_panic]
    fn test_to_external_out_of_range_panics() {
        let mut ids = IdMap::new();
        ids.map_or_get(1);
        ids.finalize();
        ids.to_external(1);
    }

    #[test]
    #[should_panic]
    fn test_to_external_before_finalize_panics() {
        let mut ids = IdMap::new();
        ids.map_or_get(1);
        ids.to_external(0);
    }
}
