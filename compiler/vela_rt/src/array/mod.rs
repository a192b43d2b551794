//! Copy-on-write associative array.
//!
//! An [`Array`] is a handle to a reference-counted storage block. Cloning
//! a handle shares the block; the first mutation through a shared handle
//! copies it ("is shared" / "make exclusive" is the only mutation gate).
//! All default-constructed arrays of one element type share a per-thread
//! empty block that is never freed.
//!
//! Storage starts as a dense vector and is promoted, permanently, to an
//! insertion-ordered hash map the first time a string key or a
//! non-contiguous int key is written.

mod inner;
mod map;
mod ops;

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::key::{ArrayKey, IntoArrayKey, KeyRef, NormalizedKey};
use crate::panic::fatal;
use crate::RuntimeValue;

use inner::{ArrayInner, InnerIter};

use map::MAX_HASHTABLE_SIZE;

/// Whether `set_value` must look for an existing entry first.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OverwriteElement {
    /// The key may already exist; overwrite it if so.
    #[default]
    Yes,
    /// The caller guarantees the key is new; skip the lookup.
    No,
}

/// Element counts and layout, as reported by `size()`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ArraySize {
    pub int_size: usize,
    pub string_size: usize,
    pub is_vector: bool,
}

thread_local! {
    static EMPTY_BLOCKS: RefCell<FxHashMap<TypeId, Rc<dyn Any>>> =
        RefCell::new(FxHashMap::default());
}

/// The shared empty block for `T` on this thread.
fn empty_block<T: 'static>() -> Rc<ArrayInner<T>> {
    EMPTY_BLOCKS.with(|blocks| {
        let shared = blocks
            .borrow_mut()
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Rc::new(ArrayInner::<T>::empty()) as Rc<dyn Any>)
            .clone();
        shared
            .downcast::<ArrayInner<T>>()
            .unwrap_or_else(|_| Rc::new(ArrayInner::empty()))
    })
}

pub struct Array<T: 'static> {
    inner: Rc<ArrayInner<T>>,
}

impl<T: Clone + 'static> Array<T> {
    pub fn new() -> Self {
        Array {
            inner: empty_block(),
        }
    }

    /// Preallocate. A vector layout is used when `string_size == 0` and
    /// `is_vector` is set.
    pub fn with_capacity(int_size: usize, string_size: usize, is_vector: bool) -> Self {
        if int_size == 0 && string_size == 0 && is_vector {
            return Self::new();
        }
        Array {
            inner: Rc::new(ArrayInner::create(int_size, string_size, is_vector)),
        }
    }

    pub fn from_vec(values: Vec<T>) -> Self {
        Array {
            inner: Rc::new(ArrayInner::from_vec(values)),
        }
    }

    // ── Sharing ─────────────────────────────────────────────────────────

    /// The block is shared by another handle (or is the empty block).
    #[inline]
    fn is_shared(&self) -> bool {
        Rc::strong_count(&self.inner) > 1
    }

    /// Exclusive access to the block, copying it first if it is shared.
    fn mutate(&mut self) -> &mut ArrayInner<T> {
        if self.is_shared() {
            tracing::trace!(
                len = self.inner.len(),
                ref_cnt = Rc::strong_count(&self.inner),
                "array copy on write"
            );
        }
        Rc::make_mut(&mut self.inner)
    }

    /// Detach from other owners now rather than at the next write.
    pub fn mutate_if_shared(&mut self) {
        self.mutate();
    }

    /// Number of handles sharing the block.
    pub fn get_reference_counter(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Whether both handles point at the same block.
    pub fn is_equal_inner_pointer(&self, other: &Array<T>) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Release this handle's block immediately. Meant for places where the
    /// runtime knows no other owner can exist; a shared block is only
    /// detached from.
    pub fn force_destroy(&mut self) {
        self.inner = empty_block();
    }

    // ── Size ────────────────────────────────────────────────────────────

    pub fn count(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn is_vector(&self) -> bool {
        self.inner.is_vector()
    }

    pub fn size(&self) -> ArraySize {
        ArraySize {
            int_size: self.inner.int_size(),
            string_size: self.inner.string_size(),
            is_vector: self.inner.is_vector(),
        }
    }

    /// The key `push_back` would use.
    pub fn get_next_key(&self) -> i64 {
        self.inner.max_key.saturating_add(1)
    }

    // ── Reads ───────────────────────────────────────────────────────────

    pub fn find_value(&self, key: impl IntoArrayKey) -> Option<&T> {
        match key.into_array_key() {
            NormalizedKey::Key(key) => self.inner.get(key.as_key_ref()),
            NormalizedKey::Append | NormalizedKey::Illegal => None,
        }
    }

    /// Present, even when the stored value is null.
    pub fn has_key(&self, key: impl IntoArrayKey) -> bool {
        self.find_value(key).is_some()
    }

    /// The value at `key`, or `T::default()` when absent.
    pub fn get_value(&self, key: impl IntoArrayKey) -> T
    where
        T: Default,
    {
        self.find_value(key).cloned().unwrap_or_default()
    }

    pub fn first_key(&self) -> Option<ArrayKey> {
        self.iter().next().map(|(k, _)| k.to_owned_key())
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.inner.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = KeyRef<'_>> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.iter().map(|(_, v)| v)
    }

    // ── Writes ──────────────────────────────────────────────────────────

    pub fn set_value(&mut self, key: impl IntoArrayKey, value: T) {
        self.set_value_with(key, value, OverwriteElement::Yes);
    }

    pub fn set_value_with(&mut self, key: impl IntoArrayKey, value: T, overwrite: OverwriteElement) {
        match key.into_array_key() {
            NormalizedKey::Key(key) => {
                self.mutate()
                    .set(key, value, overwrite == OverwriteElement::Yes);
            }
            NormalizedKey::Append => self.push_back(value),
            NormalizedKey::Illegal => {
                tracing::warn!("illegal array key, write ignored");
            }
        }
    }

    /// Mutable access to an existing element.
    pub fn get_mut(&mut self, key: impl IntoArrayKey) -> Option<&mut T> {
        let NormalizedKey::Key(key) = key.into_array_key() else {
            return None;
        };
        self.inner.get(key.as_key_ref())?;
        self.mutate().get_mut(key.as_key_ref())
    }

    /// Index-write form: the element at `key`, inserted as `T::default()`
    /// first when absent.
    pub fn get_or_insert_default(&mut self, key: impl IntoArrayKey) -> &mut T
    where
        T: Default,
    {
        let key = match key.into_array_key() {
            NormalizedKey::Key(key) => key,
            NormalizedKey::Append => ArrayKey::Int(self.get_next_key()),
            NormalizedKey::Illegal => fatal("illegal array key used for writing"),
        };
        let inner = self.mutate();
        if inner.get(key.as_key_ref()).is_none() {
            inner.set(key.clone(), T::default(), false);
        }
        match inner.get_mut(key.as_key_ref()) {
            Some(value) => value,
            None => fatal(format!("array element {key} vanished after insertion")),
        }
    }

    /// Remove `key`, returning its value.
    pub fn unset(&mut self, key: impl IntoArrayKey) -> Option<T> {
        let NormalizedKey::Key(key) = key.into_array_key() else {
            return None;
        };
        if self.inner.get(key.as_key_ref()).is_none() {
            return None;
        }
        self.mutate().unset(key.as_key_ref())
    }

    pub fn push_back(&mut self, value: T) {
        self.mutate().push_back(value);
    }

    /// Remove and return the last element. Fatal on an empty array.
    pub fn pop(&mut self) -> T {
        if self.is_empty() {
            fatal("pop from empty array");
        }
        self.mutate()
            .pop()
            .unwrap_or_else(|| fatal("pop from empty array"))
    }

    /// Remove and return the first element, renumbering int keys.
    /// Fatal on an empty array.
    pub fn shift(&mut self) -> T {
        if self.is_empty() {
            fatal("shift from empty array");
        }
        self.mutate()
            .shift()
            .unwrap_or_else(|| fatal("shift from empty array"))
    }

    /// Prepend, renumbering int keys. Returns the new count.
    pub fn unshift(&mut self, value: T) -> usize {
        self.mutate().unshift(value);
        self.count()
    }

    pub fn clear(&mut self) {
        self.inner = empty_block();
    }

    pub fn reserve(&mut self, int_size: usize, string_size: usize) {
        self.mutate().reserve(int_size, string_size);
    }

    /// Exchange the values at two int keys; `false` if either is missing.
    pub fn swap_int_keys(&mut self, a: i64, b: i64) -> bool {
        if a == b {
            return self.has_key(a);
        }
        if !(self.has_key(a) && self.has_key(b)) {
            return false;
        }
        self.mutate().swap_int_keys(a, b)
    }

    /// Replace the contents with `count` copies of `value` as a vector.
    pub fn fill_vector(&mut self, count: usize, value: &T) {
        if count > MAX_HASHTABLE_SIZE {
            fatal(format!("max array size exceeded: requested {count}"));
        }
        *self = Array::from_vec(vec![value.clone(); count]);
    }

    // ── Conversions ─────────────────────────────────────────────────────

    pub fn to_bool(&self) -> bool {
        !self.is_empty()
    }

    pub fn to_int(&self) -> i64 {
        i64::from(self.to_bool())
    }

    pub fn to_float(&self) -> f64 {
        if self.to_bool() {
            1.0
        } else {
            0.0
        }
    }

    /// Take the block out of this handle, cloning it if shared.
    fn take_inner(&mut self) -> ArrayInner<T> {
        let inner = std::mem::replace(&mut self.inner, empty_block());
        Rc::try_unwrap(inner).unwrap_or_else(|shared| (*shared).clone())
    }

    fn from_inner(inner: ArrayInner<T>) -> Self {
        Array {
            inner: Rc::new(inner),
        }
    }

    #[cfg(test)]
    fn buf_size(&self) -> usize {
        self.inner.buf_size()
    }
}

impl<T: RuntimeValue> Array<T> {
    /// Present and not null.
    pub fn isset(&self, key: impl IntoArrayKey) -> bool {
        self.find_value(key).is_some_and(|v| !v.is_null())
    }

    /// Approximate heap footprint of this array and everything it owns.
    pub fn estimate_memory_usage(&self) -> usize {
        self.inner.allocated_bytes()
            + self
                .iter()
                .map(|(key, value)| {
                    let key_bytes = match key {
                        KeyRef::Int(_) => 0,
                        KeyRef::Str(s) => s.len(),
                    };
                    key_bytes + value.estimate_memory_usage()
                })
                .sum::<usize>()
    }
}

impl<T: RuntimeValue> RuntimeValue for Array<T> {
    fn estimate_memory_usage(&self) -> usize {
        Array::estimate_memory_usage(self)
    }
}

/// Shares the block; O(1).
impl<T: 'static> Clone for Array<T> {
    fn clone(&self) -> Self {
        Array {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + 'static> Default for Array<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for Array<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Same keys with equal values, in the same order.
impl<T: Clone + PartialEq + 'static> PartialEq for Array<T> {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal_inner_pointer(other)
            || (self.count() == other.count() && self.iter().eq(other.iter()))
    }
}

impl<T: Clone + 'static> FromIterator<T> for Array<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Array::from_vec(iter.into_iter().collect())
    }
}

impl<T: Clone + 'static> From<Vec<T>> for Array<T> {
    fn from(values: Vec<T>) -> Self {
        Array::from_vec(values)
    }
}

/// Iteration in insertion order (numeric order for vectors).
pub struct Iter<'a, T> {
    inner: InnerIter<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (KeyRef<'a>, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, T: Clone + 'static> IntoIterator for &'a Array<T> {
    type Item = (KeyRef<'a>, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
