//! Per-component registry of live subscriptions.
//!
//! Entries live in an arena and are threaded into a doubly linked list, so
//! appending and removing by handle are both O(1). Handles carry the
//! generation of the entry they were issued for; a handle whose entry has
//! been removed (and possibly reused) is rejected.

use weave_core::Unsubscribe;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    index: usize,
    generation: u64,
}

struct Live {
    unsubscribe: Unsubscribe,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Entry {
    generation: u64,
    live: Option<Live>,
}

#[derive(Default)]
pub struct Subscriptions {
    entries: Vec<Entry>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Link `unsubscribe` at the tail of the list.
    pub fn append(&mut self, unsubscribe: Unsubscribe) -> SubscriptionHandle {
        let live = Live {
            unsubscribe,
            prev: self.tail,
            next: None,
        };
        let index = match self.free.pop() {
            Some(index) => {
                self.entries[index].live = Some(live);
                index
            }
            None => {
                self.entries.push(Entry {
                    generation: 0,
                    live: Some(live),
                });
                self.entries.len() - 1
            }
        };
        match self.tail {
            Some(tail) => {
                if let Some(t) = self.entries[tail].live.as_mut() {
                    t.next = Some(index);
                }
            }
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
        SubscriptionHandle {
            index,
            generation: self.entries[index].generation,
        }
    }

    pub fn contains(&self, handle: SubscriptionHandle) -> bool {
        self.entries
            .get(handle.index)
            .is_some_and(|e| e.generation == handle.generation && e.live.is_some())
    }

    /// Unlink the entry for `handle` and hand back its callback without calling it.
    /// Stale handles return `None`.
    pub fn remove(&mut self, handle: SubscriptionHandle) -> Option<Unsubscribe> {
        if !self.contains(handle) {
            return None;
        }
        let entry = &mut self.entries[handle.index];
        let live = entry.live.take()?;
        entry.generation += 1;
        match live.prev {
            Some(p) => {
                if let Some(prev) = self.entries[p].live.as_mut() {
                    prev.next = live.next;
                }
            }
            None => self.head = live.next,
        }
        match live.next {
            Some(n) => {
                if let Some(next) = self.entries[n].live.as_mut() {
                    next.prev = live.prev;
                }
            }
            None => self.tail = live.prev,
        }
        self.free.push(handle.index);
        self.len -= 1;
        Some(live.unsubscribe)
    }

    /// Remove `handle` and run its callback. Returns whether it was live.
    pub fn cancel(&mut self, handle: SubscriptionHandle) -> bool {
        match self.remove(handle) {
            Some(unsubscribe) => {
                unsubscribe.call();
                true
            }
            None => false,
        }
    }

    /// Empty the list, returning the callbacks in list order. Every
    /// outstanding handle becomes stale.
    pub fn drain(&mut self) -> Vec<Unsubscribe> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(index) = cursor {
            let entry = &mut self.entries[index];
            let Some(live) = entry.live.take() else { break };
            entry.generation += 1;
            self.free.push(index);
            cursor = live.next;
            out.push(live.unsubscribe);
        }
        self.head = None;
        self.tail = None;
        self.len = 0;
        out
    }
}
