//! Hash-table layout of array storage.
//!
//! Entries live in a slot vector. A free slot holds `None`; slot 0 is
//! reserved and always free, so [`EMPTY_POINTER`] (0) can terminate bucket
//! heads and collision chains. Occupied entries are threaded into a doubly
//! linked list in insertion order; its ends are marked with [`LIST_END`],
//! never with 0.

use crate::key::{ArrayKey, KeyRef};
use crate::panic::fatal;

pub(crate) const EMPTY_POINTER: u32 = 0;
pub(crate) const LIST_END: u32 = u32::MAX;
pub(crate) const MAX_HASHTABLE_SIZE: usize = 1 << 26;
pub(crate) const MIN_HASHTABLE_SIZE: usize = 8;

#[derive(Clone, Debug)]
pub(crate) struct Entry<T> {
    pub(crate) key: ArrayKey,
    pub(crate) value: T,
    hash: u64,
    prev: u32,
    next: u32,
    chain: u32,
}

#[derive(Clone, Debug)]
pub(crate) struct MapTable<T> {
    slots: Vec<Option<Entry<T>>>,
    /// Bucket heads, one per unit of capacity.
    buckets: Vec<u32>,
    capacity: u32,
    modulo_helper: u64,
    free: Vec<u32>,
    first: u32,
    last: u32,
    int_size: u32,
    string_size: u32,
}

/// Precomputed reciprocal for [`fastmod`].
pub(crate) fn modulo_helper(divisor: u32) -> u64 {
    (u64::MAX / u64::from(divisor)).wrapping_add(1)
}

/// `value % divisor` without a division, given `modulo_helper(divisor)`.
#[inline]
pub(crate) fn fastmod(value: u32, helper: u64, divisor: u32) -> u32 {
    let lowbits = helper.wrapping_mul(u64::from(value));
    #[expect(clippy::cast_possible_truncation, reason = "result is below divisor")]
    let result = ((u128::from(lowbits) * u128::from(divisor)) >> 64) as u32;
    result
}

/// Smallest capacity tier holding `wanted` entries. Fatal past the limit.
pub(crate) fn capacity_tier(wanted: usize) -> u32 {
    let tier = wanted.max(MIN_HASHTABLE_SIZE).next_power_of_two();
    if tier > MAX_HASHTABLE_SIZE {
        fatal(format!(
            "max array size exceeded: requested {wanted}, limit {MAX_HASHTABLE_SIZE}"
        ));
    }
    u32::try_from(tier).unwrap_or_else(|_| fatal("max array size exceeded"))
}

impl<T> MapTable<T> {
    pub(crate) fn with_capacity(wanted: usize) -> Self {
        let capacity = capacity_tier(wanted);
        let mut slots = Vec::with_capacity(capacity as usize + 1);
        slots.push(None);
        MapTable {
            slots,
            buckets: vec![EMPTY_POINTER; capacity as usize],
            capacity,
            modulo_helper: modulo_helper(capacity),
            free: Vec::new(),
            first: LIST_END,
            last: LIST_END,
            int_size: 0,
            string_size: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        (self.int_size + self.string_size) as usize
    }

    #[inline]
    pub(crate) fn int_size(&self) -> usize {
        self.int_size as usize
    }

    #[inline]
    pub(crate) fn string_size(&self) -> usize {
        self.string_size as usize
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity as usize
    }

    #[inline]
    fn choose_bucket(&self, hash: u64) -> usize {
        #[expect(clippy::cast_possible_truncation, reason = "folding hash to 32 bits")]
        let folded = (hash ^ (hash >> 32)) as u32;
        fastmod(folded, self.modulo_helper, self.capacity) as usize
    }

    #[inline]
    fn entry(&self, slot: u32) -> Option<&Entry<T>> {
        self.slots.get(slot as usize).and_then(Option::as_ref)
    }

    #[inline]
    fn entry_mut(&mut self, slot: u32) -> Option<&mut Entry<T>> {
        self.slots.get_mut(slot as usize).and_then(Option::as_mut)
    }

    /// Slot holding `key`, if present.
    pub(crate) fn find(&self, key: KeyRef<'_>) -> Option<u32> {
        let hash = key.storage_hash();
        let mut cursor = self.buckets[self.choose_bucket(hash)];
        while cursor != EMPTY_POINTER {
            let entry = self.entry(cursor)?;
            if entry.hash == hash && entry.key.as_key_ref() == key {
                return Some(cursor);
            }
            cursor = entry.chain;
        }
        None
    }

    pub(crate) fn get(&self, key: KeyRef<'_>) -> Option<&T> {
        let slot = self.find(key)?;
        self.entry(slot).map(|e| &e.value)
    }

    pub(crate) fn get_mut(&mut self, key: KeyRef<'_>) -> Option<&mut T> {
        let slot = self.find(key)?;
        self.entry_mut(slot).map(|e| &mut e.value)
    }

    pub(crate) fn value_at_mut(&mut self, slot: u32) -> Option<&mut T> {
        self.entry_mut(slot).map(|e| &mut e.value)
    }

    /// Insert a key the caller knows is absent, growing first if full.
    /// Returns the slot.
    pub(crate) fn insert_new(&mut self, key: ArrayKey, value: T) -> u32 {
        debug_assert!(self.find(key.as_key_ref()).is_none());
        if self.len() >= self.capacity() {
            self.rehash(self.capacity() * 2);
        }
        let hash = key.as_key_ref().storage_hash();
        let bucket = self.choose_bucket(hash);
        let slot = match self.free.pop() {
            Some(slot) => slot,
            None => {
                self.slots.push(None);
                u32::try_from(self.slots.len() - 1).unwrap_or_else(|_| fatal("max array size exceeded"))
            }
        };
        match key {
            ArrayKey::Int(_) => self.int_size += 1,
            ArrayKey::Str(_) => self.string_size += 1,
        }
        let prev = self.last;
        self.slots[slot as usize] = Some(Entry {
            key,
            value,
            hash,
            prev,
            next: LIST_END,
            chain: self.buckets[bucket],
        });
        self.buckets[bucket] = slot;
        if let Some(prev_entry) = self.entry_mut(prev) {
            prev_entry.next = slot;
        } else {
            self.first = slot;
        }
        self.last = slot;
        slot
    }

    /// Insert or overwrite. Returns the previous value.
    pub(crate) fn set(&mut self, key: ArrayKey, value: T) -> Option<T> {
        match self.find(key.as_key_ref()) {
            Some(slot) => self
                .value_at_mut(slot)
                .map(|old| std::mem::replace(old, value)),
            None => {
                self.insert_new(key, value);
                None
            }
        }
    }

    pub(crate) fn remove(&mut self, key: KeyRef<'_>) -> Option<(ArrayKey, T)> {
        let slot = self.find(key)?;
        self.remove_slot(slot)
    }

    pub(crate) fn remove_first(&mut self) -> Option<(ArrayKey, T)> {
        self.remove_slot(self.first)
    }

    pub(crate) fn remove_last(&mut self) -> Option<(ArrayKey, T)> {
        self.remove_slot(self.last)
    }

    fn remove_slot(&mut self, slot: u32) -> Option<(ArrayKey, T)> {
        let (hash, chain, prev, next) = {
            let entry = self.entry(slot)?;
            (entry.hash, entry.chain, entry.prev, entry.next)
        };

        // Unlink from the collision chain.
        let bucket = self.choose_bucket(hash);
        if self.buckets[bucket] == slot {
            self.buckets[bucket] = chain;
        } else {
            let mut cursor = self.buckets[bucket];
            while let Some(entry) = self.entry_mut(cursor) {
                if entry.chain == slot {
                    entry.chain = chain;
                    break;
                }
                cursor = entry.chain;
            }
        }

        // Unlink from the insertion-order list.
        match self.entry_mut(prev) {
            Some(p) => p.next = next,
            None => self.first = next,
        }
        match self.entry_mut(next) {
            Some(n) => n.prev = prev,
            None => self.last = prev,
        }

        let entry = self.slots[slot as usize].take()?;
        self.free.push(slot);
        match entry.key {
            ArrayKey::Int(_) => self.int_size -= 1,
            ArrayKey::Str(_) => self.string_size -= 1,
        }
        Some((entry.key, entry.value))
    }

    /// Exchange the values stored at two present keys.
    pub(crate) fn swap_values(&mut self, a: KeyRef<'_>, b: KeyRef<'_>) -> bool {
        let (Some(sa), Some(sb)) = (self.find(a), self.find(b)) else {
            return false;
        };
        if sa == sb {
            return true;
        }
        let (lo, hi) = if sa < sb { (sa, sb) } else { (sb, sa) };
        let (left, right) = self.slots.split_at_mut(hi as usize);
        match (left[lo as usize].as_mut(), right[0].as_mut()) {
            (Some(x), Some(y)) => {
                std::mem::swap(&mut x.value, &mut y.value);
                true
            }
            _ => false,
        }
    }

    /// Rebuild into a table of at least `wanted` capacity, keeping order.
    pub(crate) fn rehash(&mut self, wanted: usize) {
        let mut grown = MapTable::with_capacity(wanted.max(self.len()));
        tracing::trace!(
            from = self.capacity,
            to = grown.capacity,
            len = self.len(),
            "array hash table rehash"
        );
        for (key, value) in std::mem::replace(self, MapTable::empty_shell()).into_entries() {
            grown.insert_new(key, value);
        }
        *self = grown;
    }

    /// A zero-capacity placeholder used only while moving a table.
    fn empty_shell() -> Self {
        MapTable {
            slots: Vec::new(),
            buckets: Vec::new(),
            capacity: 0,
            modulo_helper: 0,
            free: Vec::new(),
            first: LIST_END,
            last: LIST_END,
            int_size: 0,
            string_size: 0,
        }
    }

    /// Consume into `(key, value)` pairs in insertion order.
    pub(crate) fn into_entries(mut self) -> Vec<(ArrayKey, T)> {
        let mut out = Vec::with_capacity(self.len());
        let mut cursor = self.first;
        while let Some(entry) = self
            .slots
            .get_mut(cursor as usize)
            .and_then(Option::take)
        {
            cursor = entry.next;
            out.push((entry.key, entry.value));
        }
        out
    }

    pub(crate) fn iter(&self) -> MapIter<'_, T> {
        MapIter {
            table: self,
            cursor: self.first,
            remaining: self.len(),
        }
    }

    pub(crate) fn first_key(&self) -> Option<KeyRef<'_>> {
        self.entry(self.first).map(|e| e.key.as_key_ref())
    }

    pub(crate) fn last_key(&self) -> Option<KeyRef<'_>> {
        self.entry(self.last).map(|e| e.key.as_key_ref())
    }

    /// Bytes held by the table itself, excluding what values own.
    pub(crate) fn allocated_bytes(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Option<Entry<T>>>()
            + self.buckets.capacity() * std::mem::size_of::<u32>()
            + self.free.capacity() * std::mem::size_of::<u32>()
    }

    /// Whether a slot holds no entry. Slot 0 is always empty.
    #[cfg(test)]
    pub(crate) fn is_empty_slot(&self, slot: u32) -> bool {
        self.entry(slot).is_none()
    }
}

pub(crate) struct MapIter<'a, T> {
    table: &'a MapTable<T>,
    cursor: u32,
    remaining: usize,
}

impl<'a, T> Iterator for MapIter<'a, T> {
    type Item = (KeyRef<'a>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.table.entry(self.cursor)?;
        self.cursor = entry.next;
        self.remaining -= 1;
        Some((entry.key.as_key_ref(), &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
