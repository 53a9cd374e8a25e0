//! Static relay registry
//!
//! Process-wide list of pending static pull reconnect tasks, owned by the
//! relay subsystem's root context. Entries live in an arena addressed by
//! generation-checked ids and are chained head to tail in insertion order,
//! so appending is O(1) and removal never invalidates other ids.

use std::sync::Arc;

use crate::registry::AppIdentity;

use super::reconnect::{ReconnectTask, StaticPull};
use super::target::RelayTarget;

/// Stable identifier of a registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId {
    index: usize,
    generation: u32,
}

/// One scheduled static pull
#[derive(Debug, Clone)]
pub struct PendingReconnectEntry {
    pub target: Arc<RelayTarget>,
    /// Server and application the entry was created under
    pub identity: AppIdentity,
    pub task: Arc<ReconnectTask>,
}

impl PendingReconnectEntry {
    pub fn new(target: Arc<RelayTarget>, identity: AppIdentity) -> Self {
        let task = ReconnectTask::new(StaticPull {
            target: Arc::clone(&target),
            identity,
        });

        Self {
            target,
            identity,
            task,
        }
    }

    /// Check whether this entry was started under `identity` as `name`
    pub fn matches(&self, identity: AppIdentity, name: &str) -> bool {
        self.identity == identity && self.target.name == name
    }
}

#[derive(Debug)]
enum Slot {
    Occupied {
        entry: PendingReconnectEntry,
        next: Option<usize>,
        generation: u32,
    },
    Vacant {
        next_free: Option<usize>,
        generation: u32,
    },
}

/// Registry of pending static pull entries
#[derive(Debug, Default)]
pub struct StaticRelayRegistry {
    slots: Vec<Slot>,
    head: Option<usize>,
    tail: Option<usize>,
    free: Option<usize>,
    len: usize,
}

impl StaticRelayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get number of entries
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<EntryId> {
        self.head.and_then(|i| self.id_at(i))
    }

    pub fn tail(&self) -> Option<EntryId> {
        self.tail.and_then(|i| self.id_at(i))
    }

    fn id_at(&self, index: usize) -> Option<EntryId> {
        match self.slots.get(index)? {
            Slot::Occupied { generation, .. } => Some(EntryId {
                index,
                generation: *generation,
            }),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get(&self, id: EntryId) -> Option<&PendingReconnectEntry> {
        match self.slots.get(id.index)? {
            Slot::Occupied {
                entry, generation, ..
            } if *generation == id.generation => Some(entry),
            _ => None,
        }
    }

    /// Entries from head to tail
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            registry: self,
            cursor: self.head,
        }
    }

    /// Append an entry at the tail
    pub fn append(&mut self, entry: PendingReconnectEntry) -> EntryId {
        let (index, generation) = match self.free {
            Some(index) => {
                let (next_free, generation) = match self.slots[index] {
                    Slot::Vacant {
                        next_free,
                        generation,
                    } => (next_free, generation),
                    Slot::Occupied { .. } => unreachable!("free list points at occupied slot"),
                };
                self.free = next_free;
                self.slots[index] = Slot::Occupied {
                    entry,
                    next: None,
                    generation,
                };
                (index, generation)
            }
            None => {
                self.slots.push(Slot::Occupied {
                    entry,
                    next: None,
                    generation: 0,
                });
                (self.slots.len() - 1, 0)
            }
        };

        match self.tail {
            Some(tail) => self.set_next(tail, Some(index)),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;

        EntryId { index, generation }
    }

    /// Cancel and remove one entry by id
    pub fn remove(&mut self, id: EntryId) -> Option<PendingReconnectEntry> {
        self.get(id)?;

        let mut prev = None;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            if index == id.index {
                let entry = self.unlink(prev, index);
                entry.task.cancel();
                return Some(entry);
            }
            prev = Some(index);
            cursor = self.next_of(index);
        }

        None
    }

    /// Cancel and remove every entry started under `identity` as `name`
    ///
    /// Entries already cancelled elsewhere are pruned during the same scan.
    /// Returns the removed live entries.
    pub fn stop(&mut self, identity: AppIdentity, name: &str) -> Vec<PendingReconnectEntry> {
        self.retain_scan(|entry| !entry.matches(identity, name))
    }

    /// Prune entries whose task was cancelled. Returns how many were dropped.
    pub fn compact(&mut self) -> usize {
        let before = self.len;
        self.retain_scan(|_| true);
        before - self.len
    }

    /// Single head-to-tail pass: prune cancelled entries, cancel and remove
    /// live entries for which `keep` is false.
    fn retain_scan<F>(&mut self, mut keep: F) -> Vec<PendingReconnectEntry>
    where
        F: FnMut(&PendingReconnectEntry) -> bool,
    {
        let mut removed = Vec::new();
        let mut prev = None;
        let mut cursor = self.head;

        while let Some(index) = cursor {
            let next = self.next_of(index);

            let (cancelled, kept) = match &self.slots[index] {
                Slot::Occupied { entry, .. } => {
                    let cancelled = entry.task.is_cancelled();
                    (cancelled, !cancelled && keep(entry))
                }
                Slot::Vacant { .. } => unreachable!("chain points at vacant slot"),
            };

            if kept {
                prev = Some(index);
            } else {
                let entry = self.unlink(prev, index);
                if cancelled {
                    tracing::debug!(name = %entry.target.name, "Pruned cancelled static pull");
                } else {
                    entry.task.cancel();
                    tracing::debug!(
                        name = %entry.target.name,
                        url = %entry.target.url,
                        "Stopped static pull"
                    );
                    removed.push(entry);
                }
            }

            cursor = next;
        }

        removed
    }

    fn next_of(&self, index: usize) -> Option<usize> {
        match &self.slots[index] {
            Slot::Occupied { next, .. } => *next,
            Slot::Vacant { .. } => None,
        }
    }

    fn set_next(&mut self, index: usize, value: Option<usize>) {
        if let Slot::Occupied { next, .. } = &mut self.slots[index] {
            *next = value;
        }
    }

    /// Unlink `index` whose predecessor is `prev`, relinking head and tail,
    /// and return its slot to the free list
    fn unlink(&mut self, prev: Option<usize>, index: usize) -> PendingReconnectEntry {
        let next = self.next_of(index);

        match prev {
            Some(prev) => self.set_next(prev, next),
            None => self.head = next,
        }
        if next.is_none() {
            self.tail = prev;
        }

        let generation = match &self.slots[index] {
            Slot::Occupied { generation, .. } => *generation,
            Slot::Vacant { generation, .. } => *generation,
        };
        let vacant = Slot::Vacant {
            next_free: self.free,
            generation: generation.wrapping_add(1),
        };
        self.free = Some(index);
        self.len -= 1;

        match std::mem::replace(&mut self.slots[index], vacant) {
            Slot::Occupied { entry, .. } => entry,
            Slot::Vacant { .. } => unreachable!("unlinked a vacant slot"),
        }
    }
}

/// Head-to-tail iterator over registry entries
pub struct Iter<'a> {
    registry: &'a StaticRelayRegistry,
    cursor: Option<usize>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (EntryId, &'a PendingReconnectEntry);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        match &self.registry.slots[index] {
            Slot::Occupied {
                entry,
                next,
                generation,
            } => {
                self.cursor = *next;
                Some((
                    EntryId {
                        index,
                        generation: *generation,
                    },
                    entry,
                ))
            }
            Slot::Vacant { .. } => None,
        }
    }
}
