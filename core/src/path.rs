use crate::ids::MappedId;

/// Growable, reusable list of predecessor ids for one node within one pass.
///
/// `clear` resets the length but keeps the allocation, so a path reused
/// across every source pass only grows, never reallocates from scratch.
#[derive(Debug, Clone, Default)]
pub struct Path {
    nodes: Vec<MappedId>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn append(&mut self, node: MappedId) {
        self.nodes.push(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Visit entries in insertion order until `visit` returns `false`.
    ///
    /// Returns `true` if every entry was visited.
    pub fn for_each_while<F>(&self, mut visit: F) -> bool
    where
        F: FnMut(MappedId) -> bool,
    {
        for &node in &self.nodes {
            if !visit(node) {
                return false;
            }
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = MappedId> + '_ {
        self.nodes.iter().copied()
    }

    pub fn as_slice(&self) -> &[MappedId] {
        &self.nodes
    }

    #[inline]
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

/// One [`Path`] per mapped node id.
///
/// An empty path means "no predecessors this pass"; nodes that never receive
/// a predecessor never allocate.
#[derive(Debug, Clone, Default)]
pub struct PredecessorPaths {
    paths: Vec<Path>,
}

impl PredecessorPaths {
    pub fn new(node_count: usize) -> Self {
        Self {
            paths: vec![Path::new(); node_count],
        }
    }

    pub fn node_count(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn append(&mut self, node: MappedId, predecessor: MappedId) {
        self.paths[node as usize].append(predecessor);
    }

    #[inline]
    pub fn get(&self, node: MappedId) -> &Path {
        &self.paths[node as usize]
    }

    pub fn clear_all(&mut self) {
        for path in &mut self.paths {
            path.clear();
        }
    }

    /// Bytes currently reserved across all paths.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let buffers: usize = self.paths.iter().map(|p| p.capacity() * size_of::<MappedId>()).sum();
        buffers + self.paths.capacity() * size_of::<Path>()
    }
}
