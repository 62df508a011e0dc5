//! Definition registries
//!
//! A registry holds every decoded definition of one kind, keyed by id. Loads
//! decode the whole archive in parallel and then publish the new table with
//! a single pointer swap, so a reader sees either the previous table or the
//! complete new one. Lookups are total: an id with no record resolves to the
//! kind's default definition, created once per table generation.

mod archive;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;

use crate::definitions::{
    AnimationDecoder, AnimationDefinition, DefinitionDecoder, DefinitionKind, GraphicDecoder,
    GraphicDefinition, ObjectDecoder, ObjectDefinition,
};

pub use archive::{ContentSource, MemoryArchive, SlotLayout};

/// Registry of object definitions.
pub type ObjectRegistry = DefinitionRegistry<ObjectDefinition, ObjectDecoder>;
/// Registry of animation definitions.
pub type AnimationRegistry = DefinitionRegistry<AnimationDefinition, AnimationDecoder>;
/// Registry of graphic definitions.
pub type GraphicRegistry = DefinitionRegistry<GraphicDefinition, GraphicDecoder>;

/// Outcome of a registry load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub kind: DefinitionKind,
    /// Records found in the archive, including malformed ones.
    pub decoded: usize,
    /// Records that decoded with an issue and were kept partially.
    pub malformed: usize,
    /// Generation number of the published table.
    pub generation: u64,
}

/// One published generation of a registry.
#[derive(Debug)]
pub struct DefinitionTable<T> {
    entries: HashMap<u32, Arc<T>>,
    defaults: Mutex<HashMap<u32, Arc<T>>>,
    generation: u64,
}

impl<T> DefinitionTable<T> {
    fn new(entries: HashMap<u32, Arc<T>>, generation: u64) -> Self {
        Self {
            entries,
            defaults: Mutex::new(HashMap::new()),
            generation,
        }
    }

    /// Decoded definition for `id`, if the archive had a record for it.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Arc<T>> {
        self.entries.get(&id)
    }

    /// Number of decoded definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Iterate decoded definitions in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Arc<T>)> {
        self.entries.iter().map(|(&id, def)| (id, def))
    }
}

/// Id-keyed store of one definition kind.
pub struct DefinitionRegistry<T, D> {
    decoder: D,
    table: RwLock<Arc<DefinitionTable<T>>>,
}

impl<T, D> DefinitionRegistry<T, D>
where
    T: Send + Sync,
    D: DefinitionDecoder<T>,
{
    /// Create an empty registry.
    #[must_use]
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            table: RwLock::new(Arc::new(DefinitionTable::new(HashMap::new(), 0))),
        }
    }

    #[must_use]
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Decode every record in `source` and replace the current table.
    ///
    /// Malformed records are kept with whatever fields decoded before the
    /// failure; no single record can fail the load.
    pub fn load<S: ContentSource + ?Sized>(&self, source: &S) -> LoadSummary {
        let kind = self.decoder.kind();
        let bound = source.upper_bound();

        let decoded: Vec<(u32, Arc<T>, bool)> = (0..bound)
            .into_par_iter()
            .filter_map(|id| {
                let data = source.read(source.container_for(id), source.slot_for(id))?;
                let result = self.decoder.decode(id, data);
                Some((id, Arc::new(result.definition), result.issue.is_some()))
            })
            .collect();

        let malformed = decoded.iter().filter(|(_, _, bad)| *bad).count();
        let entries: HashMap<u32, Arc<T>> =
            decoded.into_iter().map(|(id, def, _)| (id, def)).collect();
        let count = entries.len();

        let generation = {
            let mut table = self.table.write();
            let generation = table.generation + 1;
            *table = Arc::new(DefinitionTable::new(entries, generation));
            generation
        };

        tracing::info!(
            "Loaded {} {} definitions ({} malformed, bound {}, generation {})",
            count,
            kind,
            malformed,
            bound,
            generation
        );

        LoadSummary {
            kind,
            decoded: count,
            malformed,
            generation,
        }
    }

    /// Definition for `id`, or the default definition if there is no record.
    ///
    /// Repeated lookups of a missing id return the same instance until the
    /// next load.
    #[must_use]
    pub fn lookup(&self, id: u32) -> Arc<T> {
        let table = self.snapshot();
        if let Some(def) = table.entries.get(&id) {
            return Arc::clone(def);
        }
        let mut defaults = table.defaults.lock();
        Arc::clone(
            defaults
                .entry(id)
                .or_insert_with(|| Arc::new(self.decoder.empty(id))),
        )
    }

    /// Decoded definition for `id`, without falling back to a default.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<Arc<T>> {
        self.table.read().entries.get(&id).cloned()
    }

    /// Number of decoded definitions in the current table.
    #[must_use]
    pub fn count(&self) -> usize {
        self.table.read().len()
    }

    /// Generation of the current table; 0 before the first load.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.table.read().generation
    }

    /// The current table. Stays valid and unchanged across later loads.
    #[must_use]
    pub fn snapshot(&self) -> Arc<DefinitionTable<T>> {
        Arc::clone(&self.table.read())
    }
}

impl<T, D> Default for DefinitionRegistry<T, D>
where
    T: Send + Sync,
    D: DefinitionDecoder<T> + Default,
{
    fn default() -> Self {
        Self::new(D::default())
    }
}

impl<T, D: std::fmt::Debug> std::fmt::Debug for DefinitionRegistry<T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.table.read();
        f.debug_struct("DefinitionRegistry")
            .field("decoder", &self.decoder)
            .field("count", &table.len())
            .field("generation", &table.generation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archive() -> MemoryArchive {
        MemoryArchive::new(SlotLayout::OBJECTS)
            .with_record(1, vec![14, 3, 0])
            .with_record(2, vec![14])
            .with_record(300, vec![15, 2, 0])
    }

    #[test]
    fn test_load_counts_and_generation() {
        let registry = ObjectRegistry::default();
        assert_eq!(registry.generation(), 0);

        let summary = registry.load(&archive());
        assert_eq!(summary.kind, DefinitionKind::Object);
        assert_eq!(summary.decoded, 3);
        assert_eq!(summary.malformed, 1);
        assert_eq!(summary.generation, 1);
        assert_eq!(registry.count(), 3);
        assert_eq!(registry.lookup(1).width, 3);
        assert_eq!(registry.lookup(300).length, 2);
    }

    #[test]
    fn test_lookup_missing_is_cached_default() {
        let registry = ObjectRegistry::default();
        registry.load(&archive());

        let first = registry.lookup(u32::MAX);
        let second = registry.lookup(u32::MAX);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.id, u32::MAX);
        assert!(registry.get(u32::MAX).is_none());
        assert_eq!(registry.count(), 3);
    }

    #[test]
    fn test_reload_swaps_whole_table() {
        let registry = ObjectRegistry::default();
        registry.load(&archive());
        let old = registry.snapshot();
        let old_default = registry.lookup(50);

        let replacement = MemoryArchive::new(SlotLayout::OBJECTS).with_record(7, vec![0]);
        let summary = registry.load(&replacement);
        assert_eq!(summary.generation, 2);
        assert_eq!(registry.count(), 1);
        assert!(registry.get(1).is_none());
        // Old snapshot is untouched.
        assert_eq!(old.len(), 3);
        assert!(old.get(1).is_some());
        // Defaults belong to the generation that made them.
        assert!(!Arc::ptr_eq(&old_default, &registry.lookup(50)));
    }
}
