//! Generation-checked handle tables for objects owned across the C ABI.
//!
//! A handle packs a slot index (upper 32 bits) and the slot's generation
//! (lower 32 bits). Destroying an object bumps the slot generation, so a
//! handle kept past `*_destroy` no longer resolves. Destroying twice is a
//! no-op that reports `InvalidHandle`.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Handle {
    slot: u32,
    generation: u32,
}

impl Handle {
    fn pack(self) -> u64 {
        (u64::from(self.slot) << 32) | u64::from(self.generation)
    }

    fn unpack(raw: u64) -> Self {
        Self {
            slot: (raw >> 32) as u32,
            generation: raw as u32,
        }
    }
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Maps `u64` handles to owned values, recycling vacated slots.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
    vacant: Vec<u32>,
}

impl<T> HandleTable<T> {
    /// An empty table. `const` so it can back a `static Mutex`.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Take ownership of `value` and return its handle.
    pub fn insert(&mut self, value: T) -> u64 {
        if let Some(slot) = self.vacant.pop() {
            let entry = &mut self.entries[slot as usize];
            entry.value = Some(value);
            return Handle {
                slot,
                generation: entry.generation,
            }
            .pack();
        }
        // Slot indices are u32 by encoding.
        let slot = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            value: Some(value),
        });
        Handle {
            slot,
            generation: 0,
        }
        .pack()
    }

    /// The value behind `raw`, if the handle is live.
    pub fn get(&self, raw: u64) -> Option<&T> {
        let handle = Handle::unpack(raw);
        let entry = self.entries.get(handle.slot as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.value.as_ref()
    }

    /// Remove and return the value behind `raw`.
    ///
    /// A slot whose generation wraps to zero is retired instead of being
    /// recycled, so handles from its first epoch can never resolve again.
    pub fn remove(&mut self, raw: u64) -> Option<T> {
        let handle = Handle::unpack(raw);
        let entry = self.entries.get_mut(handle.slot as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        if entry.generation != 0 {
            self.vacant.push(handle.slot);
        }
        Some(value)
    }

    /// Number of live objects.
    #[cfg(test)]
    pub fn live(&self) -> usize {
        self.entries.iter().filter(|e| e.value.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_packs_slot_high_generation_low() {
        let h = Handle {
            slot: 3,
            generation: 9,
        };
        assert_eq!(h.pack(), (3u64 << 32) | 9);
        assert_eq!(Handle::unpack(h.pack()), h);
    }

    #[test]
    fn inserted_value_resolves() {
        let mut table = HandleTable::new();
        let h = table.insert("cache");
        assert_eq!(table.get(h), Some(&"cache"));
        assert_eq!(table.live(), 1);
    }

    #[test]
    fn removed_handle_goes_stale() {
        let mut table = HandleTable::new();
        let h = table.insert(1u8);
        assert_eq!(table.remove(h), Some(1));
        assert_eq!(table.get(h), None);
        assert_eq!(table.remove(h), None);
        assert_eq!(table.live(), 0);
    }

    #[test]
    fn vacated_slot_is_reused_with_new_generation() {
        let mut table = HandleTable::new();
        let first = table.insert(1u8);
        table.remove(first);
        let second = table.insert(2u8);

        let (a, b) = (Handle::unpack(first), Handle::unpack(second));
        assert_eq!(a.slot, b.slot);
        assert_eq!(b.generation, a.generation + 1);
        assert_eq!(table.get(first), None);
        assert_eq!(table.get(second), Some(&2));
    }

    #[test]
    fn unknown_slot_is_rejected() {
        let table: HandleTable<u8> = HandleTable::new();
        assert_eq!(table.get(Handle { slot: 42, generation: 0 }.pack()), None);
    }

    #[test]
    fn wrapped_generation_retires_slot() {
        let mut table = HandleTable::new();
        let h = table.insert(0u8);
        table.remove(h);
        table.entries[0].generation = u32::MAX;

        let last = table.insert(1u8);
        assert_eq!(Handle::unpack(last).generation, u32::MAX);
        table.remove(last);
        assert_eq!(table.entries[0].generation, 0);
        assert!(table.vacant.is_empty());

        // A first-epoch handle must not see the retired slot.
        assert_eq!(table.get(h), None);
        let fresh = table.insert(2u8);
        assert_eq!(Handle::unpack(fresh).slot, 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn only_live_handles_resolve(ops in proptest::collection::vec(any::<bool>(), 1..200)) {
                let mut table = HandleTable::new();
                let mut live: Vec<(u64, usize)> = Vec::new();
                let mut dead: Vec<u64> = Vec::new();
                for (i, insert) in ops.into_iter().enumerate() {
                    if insert || live.is_empty() {
                        live.push((table.insert(i), i));
                    } else {
                        let (h, v) = live.swap_remove(i % live.len());
                        prop_assert_eq!(table.remove(h), Some(v));
                        dead.push(h);
                    }
                }
                for &(h, v) in &live {
                    prop_assert_eq!(table.get(h), Some(&v));
                }
                for &h in &dead {
                    prop_assert_eq!(table.get(h), None);
                }
                prop_assert_eq!(table.live(), live.len());
            }
        }
    }
}
