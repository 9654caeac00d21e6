//! Generation-checked handles for runtimes owned by the boundary.
//!
//! A handle packs a slot index and the slot's generation. Removing a
//! value bumps the generation, so a handle kept by the host after its
//! runtime was dropped resolves to nothing instead of to whatever the
//! slot holds next. The raw value `0` never names a slot.

/// A decoded handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Handle {
    slot: u32,
    generation: u32,
}

impl Handle {
    /// Upper 32 bits hold the generation, lower 32 bits the slot plus one.
    fn to_raw(self) -> u64 {
        (u64::from(self.generation) << 32) | (u64::from(self.slot) + 1)
    }

    fn from_raw(raw: u64) -> Option<Self> {
        let slot = (raw & u64::from(u32::MAX)).checked_sub(1)?;
        Some(Self {
            slot: slot as u32,
            generation: (raw >> 32) as u32,
        })
    }
}

enum Entry<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32 },
    /// Generation wrapped; never handed out again.
    Retired,
}

/// Owns values addressed by `u64` handles, reusing vacant slots.
pub(crate) struct HandleTable<T> {
    entries: Vec<Entry<T>>,
}

impl<T> HandleTable<T> {
    /// An empty table.
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Store `value` and return its handle.
    pub fn insert(&mut self, value: T) -> u64 {
        let vacant = self.entries.iter().position(|e| matches!(e, Entry::Vacant { .. }));
        let handle = match vacant {
            Some(slot) => {
                let generation = match self.entries[slot] {
                    Entry::Vacant { generation } => generation,
                    _ => 0,
                };
                self.entries[slot] = Entry::Occupied { generation, value };
                Handle {
                    slot: slot as u32,
                    generation,
                }
            }
            None => {
                self.entries.push(Entry::Occupied { generation: 0, value });
                Handle {
                    slot: (self.entries.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        handle.to_raw()
    }

    /// The value behind `raw`, if the handle is current.
    pub fn get_mut(&mut self, raw: u64) -> Option<&mut T> {
        let handle = Handle::from_raw(raw)?;
        match self.entries.get_mut(handle.slot as usize)? {
            Entry::Occupied { generation, value } if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Take the value behind `raw` out of the table.
    ///
    /// Removing a stale or unknown handle is a no-op returning `None`.
    pub fn remove(&mut self, raw: u64) -> Option<T> {
        let handle = Handle::from_raw(raw)?;
        let entry = self.entries.get_mut(handle.slot as usize)?;
        if !matches!(entry, Entry::Occupied { generation, .. } if *generation == handle.generation) {
            return None;
        }
        let next = match handle.generation.checked_add(1) {
            Some(generation) => Entry::Vacant { generation },
            None => Entry::Retired,
        };
        match std::mem::replace(entry, next) {
            Entry::Occupied { value, .. } => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_never_a_handle() {
        let mut table = HandleTable::new();
        let h = table.insert("rt");
        assert_ne!(h, 0);
        assert_eq!(table.get_mut(0), None);
        assert_eq!(table.remove(0), None);
    }

    #[test]
    fn removed_handle_goes_stale() {
        let mut table = HandleTable::new();
        let h = table.insert(1i32);
        *table.get_mut(h).unwrap() += 1;
        assert_eq!(table.remove(h), Some(2));
        assert_eq!(table.get_mut(h), None);
        assert_eq!(table.remove(h), None);
    }

    #[test]
    fn vacant_slot_is_reused_under_new_generation() {
        let mut table = HandleTable::new();
        let first = table.insert(1i32);
        table.remove(first);
        let second = table.insert(2i32);
        let (a, b) = (Handle::from_raw(first).unwrap(), Handle::from_raw(second).unwrap());
        assert_eq!(a.slot, b.slot);
        assert_eq!(b.generation, a.generation + 1);
        assert_eq!(table.get_mut(first), None);
        assert_eq!(table.get_mut(second), Some(&mut 2));
    }

    #[test]
    fn occupied_slots_are_independent() {
        let mut table = HandleTable::new();
        let a = table.insert('a');
        let b = table.insert('b');
        assert_ne!(a, b);
        assert_eq!(table.remove(a), Some('a'));
        assert_eq!(table.get_mut(b), Some(&mut 'b'));
    }

    #[test]
    fn wrapped_generation_retires_slot() {
        let mut table = HandleTable::new();
        table.entries.push(Entry::Vacant { generation: u32::MAX });
        let last = table.insert(1i32);
        assert_eq!(Handle::from_raw(last).unwrap().generation, u32::MAX);
        assert_eq!(table.remove(last), Some(1));
        assert!(matches!(table.entries[0], Entry::Retired));
        let next = table.insert(2i32);
        assert_eq!(Handle::from_raw(next).unwrap().slot, 1);
    }
}
