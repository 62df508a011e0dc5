//! Upstream content store contract and an in-memory implementation

use std::collections::BTreeMap;

/// Read access to the archive that backs one definition kind.
///
/// Only the registry load touches this; lookups afterwards never do.
pub trait ContentSource: Sync {
    /// Container (archive) holding the record for `id`.
    fn container_for(&self, id: u32) -> u32;

    /// Slot (file) within the container holding the record for `id`.
    fn slot_for(&self, id: u32) -> u32;

    /// Raw record bytes, or `None` if the slot is absent.
    fn read(&self, container: u32, slot: u32) -> Option<&[u8]>;

    /// One past the highest addressable id.
    fn upper_bound(&self) -> u32;
}

/// How ids map onto containers and slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotLayout {
    /// `bits` low bits select the slot, the rest select the container.
    Packed { bits: u32 },
    /// Everything lives in container 0 with slot = id.
    Flat,
}

impl SlotLayout {
    /// Object archives pack 256 records per container.
    pub const OBJECTS: Self = Self::Packed { bits: 8 };
}

/// Content store held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryArchive {
    layout: SlotLayout,
    containers: BTreeMap<u32, BTreeMap<u32, Vec<u8>>>,
}

impl MemoryArchive {
    #[must_use]
    pub fn new(layout: SlotLayout) -> Self {
        Self {
            layout,
            containers: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn layout(&self) -> SlotLayout {
        self.layout
    }

    /// Store raw bytes at an explicit container and slot.
    pub fn insert(&mut self, container: u32, slot: u32, data: Vec<u8>) {
        self.containers.entry(container).or_default().insert(slot, data);
    }

    /// Store a record under its definition id.
    pub fn insert_record(&mut self, id: u32, data: Vec<u8>) {
        let (container, slot) = (self.container_for(id), self.slot_for(id));
        self.insert(container, slot, data);
    }

    /// Builder-style [`insert_record`](Self::insert_record).
    #[must_use]
    pub fn with_record(mut self, id: u32, data: Vec<u8>) -> Self {
        self.insert_record(id, data);
        self
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.containers.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ContentSource for MemoryArchive {
    fn container_for(&self, id: u32) -> u32 {
        match self.layout {
            SlotLayout::Packed { bits } => id.checked_shr(bits).unwrap_or(0),
            SlotLayout::Flat => 0,
        }
    }

    fn slot_for(&self, id: u32) -> u32 {
        match self.layout {
            SlotLayout::Packed { bits } if bits < 32 => id & ((1 << bits) - 1),
            _ => id,
        }
    }

    fn read(&self, container: u32, slot: u32) -> Option<&[u8]> {
        self.containers
            .get(&container)
            .and_then(|slots| slots.get(&slot))
            .map(Vec::as_slice)
    }

    fn upper_bound(&self) -> u32 {
        let Some((&last_container, slots)) = self.containers.iter().next_back() else {
            return 0;
        };
        let last_slot = slots.keys().next_back().copied().unwrap_or(0);
        match self.layout {
            SlotLayout::Packed { bits } => last_container
                .checked_shl(bits)
                .unwrap_or(0)
                .saturating_add(last_slot)
                .saturating_add(1),
            SlotLayout::Flat => last_slot.saturating_add(1),
        }
    }
}
