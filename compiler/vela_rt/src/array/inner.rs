//! Array storage block: a dense vector or a hash map, plus `max_key`.
//!
//! The block knows nothing about sharing; the façade guarantees it only
//! ever mutates a block it owns exclusively.

use super::map::{capacity_tier, MapIter, MapTable, MAX_HASHTABLE_SIZE};
use crate::key::{ArrayKey, KeyRef};
use crate::panic::fatal;

const MIN_VECTOR_CAPACITY: usize = 4;

#[derive(Clone, Debug)]
pub(crate) enum Repr<T> {
    /// Keys `0..len`, no gaps, no string keys.
    Vector(Vec<T>),
    Map(MapTable<T>),
}

#[derive(Clone, Debug)]
pub(crate) struct ArrayInner<T> {
    /// Every int key is `<= max_key`; `-1` when none was ever stored.
    pub(crate) max_key: i64,
    pub(crate) repr: Repr<T>,
}

impl<T> ArrayInner<T> {
    pub(crate) fn empty() -> Self {
        ArrayInner {
            max_key: -1,
            repr: Repr::Vector(Vec::new()),
        }
    }

    /// Vector layout when no string keys are expected and a vector was
    /// asked for, otherwise a map sized to the next capacity tier.
    pub(crate) fn create(int_capacity: usize, string_capacity: usize, want_vector: bool) -> Self {
        let repr = if string_capacity == 0 && want_vector {
            if int_capacity > MAX_HASHTABLE_SIZE {
                fatal(format!("max array size exceeded: requested {int_capacity}"));
            }
            Repr::Vector(Vec::with_capacity(int_capacity))
        } else {
            Repr::Map(MapTable::with_capacity(int_capacity + string_capacity))
        };
        ArrayInner { max_key: -1, repr }
    }

    pub(crate) fn from_vec(values: Vec<T>) -> Self {
        let max_key = i64::try_from(values.len()).unwrap_or(i64::MAX) - 1;
        ArrayInner {
            max_key,
            repr: Repr::Vector(values),
        }
    }

    /// Build a map block from ordered entries.
    pub(crate) fn from_entries(entries: Vec<(ArrayKey, T)>) -> Self {
        let mut table = MapTable::with_capacity(entries.len());
        let mut max_key = -1;
        for (key, value) in entries {
            if let ArrayKey::Int(k) = key {
                max_key = max_key.max(k);
            }
            table.set(key, value);
        }
        ArrayInner {
            max_key,
            repr: Repr::Map(table),
        }
    }

    #[inline]
    pub(crate) fn is_vector(&self) -> bool {
        matches!(self.repr, Repr::Vector(_))
    }

    pub(crate) fn len(&self) -> usize {
        match &self.repr {
            Repr::Vector(v) => v.len(),
            Repr::Map(m) => m.len(),
        }
    }

    pub(crate) fn int_size(&self) -> usize {
        match &self.repr {
            Repr::Vector(v) => v.len(),
            Repr::Map(m) => m.int_size(),
        }
    }

    pub(crate) fn string_size(&self) -> usize {
        match &self.repr {
            Repr::Vector(_) => 0,
            Repr::Map(m) => m.string_size(),
        }
    }

    pub(crate) fn get(&self, key: KeyRef<'_>) -> Option<&T> {
        match (&self.repr, key) {
            (Repr::Vector(v), KeyRef::Int(k)) => usize::try_from(k).ok().and_then(|i| v.get(i)),
            (Repr::Vector(_), KeyRef::Str(_)) => None,
            (Repr::Map(m), _) => m.get(key),
        }
    }

    pub(crate) fn get_mut(&mut self, key: KeyRef<'_>) -> Option<&mut T> {
        match (&mut self.repr, key) {
            (Repr::Vector(v), KeyRef::Int(k)) => {
                usize::try_from(k).ok().and_then(move |i| v.get_mut(i))
            }
            (Repr::Vector(_), KeyRef::Str(_)) => None,
            (Repr::Map(m), _) => m.get_mut(key),
        }
    }

    /// One-way promotion of a vector block to the map layout.
    pub(crate) fn convert_to_map(&mut self) {
        let Repr::Vector(values) = &mut self.repr else {
            return;
        };
        let values = std::mem::take(values);
        tracing::debug!(len = values.len(), "array promoted from vector to map");
        let mut table = MapTable::with_capacity(values.len() + 1);
        for (index, value) in values.into_iter().enumerate() {
            table.insert_new(ArrayKey::Int(index_key(index)), value);
        }
        self.repr = Repr::Map(table);
    }

    /// Append at `max_key + 1`.
    pub(crate) fn push_back(&mut self, value: T) {
        match &mut self.repr {
            Repr::Vector(v) => {
                if v.len() == v.capacity() {
                    let grow = v.capacity().max(MIN_VECTOR_CAPACITY);
                    if v.len() + grow > MAX_HASHTABLE_SIZE {
                        fatal(format!("max array size exceeded: {}", v.len() + 1));
                    }
                    tracing::trace!(from = v.capacity(), to = v.capacity() + grow, "array vector grow");
                    v.reserve_exact(grow);
                }
                v.push(value);
                self.max_key = index_key(v.len()) - 1;
            }
            Repr::Map(m) => {
                let key = self
                    .max_key
                    .checked_add(1)
                    .unwrap_or_else(|| fatal("cannot add element: next int key overflows"));
                m.insert_new(ArrayKey::Int(key), value);
                self.max_key = key;
            }
        }
    }

    /// Insert or overwrite `key`. With `may_exist == false` the caller
    /// guarantees the key is absent and the existence check is skipped.
    pub(crate) fn set(&mut self, key: ArrayKey, value: T, may_exist: bool) {
        if let (Repr::Vector(v), ArrayKey::Int(k)) = (&mut self.repr, &key) {
            match usize::try_from(*k) {
                Ok(index) if index < v.len() => {
                    v[index] = value;
                    return;
                }
                Ok(index) if index == v.len() => {
                    self.push_back(value);
                    return;
                }
                _ => {}
            }
        }
        self.convert_to_map();
        if let ArrayKey::Int(k) = key {
            self.max_key = self.max_key.max(k);
        }
        if let Repr::Map(m) = &mut self.repr {
            if may_exist {
                m.set(key, value);
            } else {
                m.insert_new(key, value);
            }
        }
    }

    /// Remove `key`. Dropping the last element of a vector keeps the vector
    /// layout; any other removal from a vector promotes it.
    pub(crate) fn unset(&mut self, key: KeyRef<'_>) -> Option<T> {
        if let Repr::Vector(v) = &mut self.repr {
            let index = match key {
                KeyRef::Int(k) => usize::try_from(k).ok().filter(|i| *i < v.len())?,
                KeyRef::Str(_) => return None,
            };
            if index + 1 == v.len() {
                let value = v.pop();
                self.max_key -= 1;
                return value;
            }
            self.convert_to_map();
        }
        match &mut self.repr {
            Repr::Map(m) => m.remove(key).map(|(_, value)| value),
            Repr::Vector(_) => None,
        }
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        match &mut self.repr {
            Repr::Vector(v) => {
                let value = v.pop();
                self.max_key = index_key(v.len()) - 1;
                value
            }
            Repr::Map(m) => {
                let (key, value) = m.remove_last()?;
                if key == ArrayKey::Int(self.max_key) {
                    self.max_key -= 1;
                }
                Some(value)
            }
        }
    }

    /// Remove the first element and renumber int keys from zero.
    pub(crate) fn shift(&mut self) -> Option<T> {
        match &mut self.repr {
            Repr::Vector(v) => {
                if v.is_empty() {
                    return None;
                }
                let value = v.remove(0);
                self.max_key = index_key(v.len()) - 1;
                Some(value)
            }
            Repr::Map(m) => {
                let (_, value) = m.remove_first()?;
                let rest = std::mem::replace(m, MapTable::with_capacity(0)).into_entries();
                self.rebuild_renumbered(None, rest);
                Some(value)
            }
        }
    }

    /// Prepend `value` at key 0 and renumber the other int keys.
    pub(crate) fn unshift(&mut self, value: T) {
        match &mut self.repr {
            Repr::Vector(v) => {
                v.insert(0, value);
                self.max_key = index_key(v.len()) - 1;
            }
            Repr::Map(m) => {
                let rest = std::mem::replace(m, MapTable::with_capacity(0)).into_entries();
                self.rebuild_renumbered(Some(value), rest);
            }
        }
    }

    fn rebuild_renumbered(&mut self, head: Option<T>, rest: Vec<(ArrayKey, T)>) {
        let mut table = MapTable::with_capacity(rest.len() + usize::from(head.is_some()));
        let mut next: i64 = 0;
        for (key, value) in head.map(|v| (ArrayKey::Int(0), v)).into_iter().chain(rest) {
            match key {
                ArrayKey::Int(_) => {
                    table.insert_new(ArrayKey::Int(next), value);
                    next += 1;
                }
                key @ ArrayKey::Str(_) => {
                    table.insert_new(key, value);
                }
            }
        }
        self.max_key = next - 1;
        self.repr = Repr::Map(table);
    }

    /// Make room for `int_size` more int keys and `string_size` more
    /// string keys.
    pub(crate) fn reserve(&mut self, int_size: usize, string_size: usize) {
        if string_size > 0 {
            self.convert_to_map();
        }
        let wanted = self.len() + int_size + string_size;
        match &mut self.repr {
            Repr::Vector(v) => {
                if wanted > MAX_HASHTABLE_SIZE {
                    fatal(format!("max array size exceeded: requested {wanted}"));
                }
                v.reserve_exact(wanted.saturating_sub(v.len()));
            }
            Repr::Map(m) => {
                if wanted > m.capacity() {
                    m.rehash(capacity_tier(wanted) as usize);
                }
            }
        }
    }

    pub(crate) fn swap_int_keys(&mut self, a: i64, b: i64) -> bool {
        match &mut self.repr {
            Repr::Vector(v) => match (usize::try_from(a), usize::try_from(b)) {
                (Ok(i), Ok(j)) if i < v.len() && j < v.len() => {
                    v.swap(i, j);
                    true
                }
                _ => false,
            },
            Repr::Map(m) => m.swap_values(KeyRef::Int(a), KeyRef::Int(b)),
        }
    }

    /// Consume into ordered `(key, value)` pairs.
    pub(crate) fn into_entries(self) -> Vec<(ArrayKey, T)> {
        match self.repr {
            Repr::Vector(v) => v
                .into_iter()
                .enumerate()
                .map(|(i, value)| (ArrayKey::Int(index_key(i)), value))
                .collect(),
            Repr::Map(m) => m.into_entries(),
        }
    }

    pub(crate) fn iter(&self) -> InnerIter<'_, T> {
        match &self.repr {
            Repr::Vector(v) => InnerIter::Vector(v.iter().enumerate()),
            Repr::Map(m) => InnerIter::Map(m.iter()),
        }
    }

    /// Bytes held by the block, excluding what values own.
    pub(crate) fn allocated_bytes(&self) -> usize {
        std::mem::size_of::<Self>()
            + match &self.repr {
                Repr::Vector(v) => v.capacity() * std::mem::size_of::<T>(),
                Repr::Map(m) => m.allocated_bytes(),
            }
    }

    /// Allocated element capacity of the current layout.
    pub(crate) fn buf_size(&self) -> usize {
        match &self.repr {
            Repr::Vector(v) => v.capacity(),
            Repr::Map(m) => m.capacity(),
        }
    }
}

pub(crate) enum InnerIter<'a, T> {
    Vector(std::iter::Enumerate<std::slice::Iter<'a, T>>),
    Map(MapIter<'a, T>),
}

impl<'a, T> Iterator for InnerIter<'a, T> {
    type Item = (KeyRef<'a>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            InnerIter::Vector(it) => it.next().map(|(i, v)| (KeyRef::Int(index_key(i)), v)),
            InnerIter::Map(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            InnerIter::Vector(it) => it.size_hint(),
            InnerIter::Map(it) => it.size_hint(),
        }
    }
}

#[inline]
fn index_key(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}
