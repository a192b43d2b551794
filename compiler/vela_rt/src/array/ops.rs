//! Whole-array operations: merge, union, sorting, element conversion.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign};

use super::inner::ArrayInner;
use super::Array;
use crate::key::{ArrayKey, KeyRef};

impl<T: Clone + 'static> Array<T> {
    /// Merge `other` into `self`: int keys of `other` are appended with
    /// fresh keys; its string keys are added unless `self` already has them.
    pub fn merge_with(&mut self, other: &Array<T>) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() && other.is_vector() {
            *self = other.clone();
            return;
        }
        self.reserve(other.size().int_size, other.size().string_size);
        for (key, value) in other {
            match key {
                KeyRef::Int(_) => self.push_back(value.clone()),
                KeyRef::Str(_) => {
                    if self.inner.get(key).is_none() {
                        self.mutate().set(key.to_owned_key(), value.clone(), false);
                    }
                }
            }
        }
    }

    /// Union in place: keys of `other` missing from `self` are added, in
    /// `other`'s order. Existing keys keep their values.
    pub fn add_assign_from(&mut self, other: &Array<T>) {
        if other.is_empty() || self.is_equal_inner_pointer(other) {
            return;
        }
        if self.is_empty() {
            *self = other.clone();
            return;
        }
        for (key, value) in other {
            if self.inner.get(key).is_none() {
                self.mutate().set(key.to_owned_key(), value.clone(), false);
            }
        }
    }

    /// Stable sort of values. With `renumber` the result is a vector keyed
    /// `0..n`; otherwise each value keeps its key.
    pub fn sort_by<F>(&mut self, mut compare: F, renumber: bool)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        if self.count() < 2 {
            if renumber && !self.is_vector() {
                let values = self.take_inner().into_entries().into_iter().map(|(_, v)| v);
                *self = values.collect();
            }
            return;
        }
        let mut entries = self.take_inner().into_entries();
        entries.sort_by(|(_, a), (_, b)| compare(a, b));
        *self = if renumber {
            Array::from_vec(entries.into_iter().map(|(_, v)| v).collect())
        } else {
            Array::from_inner(ArrayInner::from_entries(entries))
        };
    }

    /// Stable sort by key, keeping key/value association.
    pub fn ksort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(KeyRef<'_>, KeyRef<'_>) -> Ordering,
    {
        if self.count() < 2 {
            return;
        }
        let was_vector = self.is_vector();
        let mut entries = self.take_inner().into_entries();
        entries.sort_by(|(a, _), (b, _)| compare(a.as_key_ref(), b.as_key_ref()));
        let still_dense = was_vector
            && entries
                .iter()
                .zip(0_i64..)
                .all(|((key, _), index)| *key == ArrayKey::Int(index));
        let inner = if still_dense {
            ArrayInner::from_vec(entries.into_iter().map(|(_, value)| value).collect())
        } else {
            ArrayInner::from_entries(entries)
        };
        *self = Array::from_inner(inner);
    }

    /// Stable sort by key using the default key order: ints before
    /// strings, ints numerically, strings bytewise.
    pub fn ksort(&mut self) {
        self.ksort_by(|a, b| a.default_cmp(b));
    }

    /// Build an array of `T` from an array of `U`, keeping keys, order and
    /// layout. Always a fresh block.
    pub fn convert_from<U>(other: &Array<U>) -> Self
    where
        U: Clone + 'static,
        T: From<U>,
    {
        if other.is_empty() {
            return Array::new();
        }
        if other.is_vector() {
            return Array::from_vec(other.values().cloned().map(T::from).collect());
        }
        let entries: Vec<(ArrayKey, T)> = other
            .iter()
            .map(|(k, v)| (k.to_owned_key(), T::from(v.clone())))
            .collect();
        Array::from_inner(ArrayInner::from_entries(entries))
    }
}

/// Array union: left keys win.
impl<T: Clone + 'static> Add for &Array<T> {
    type Output = Array<T>;

    fn add(self, rhs: &Array<T>) -> Array<T> {
        let mut out = self.clone();
        out.add_assign_from(rhs);
        out
    }
}

impl<T: Clone + 'static> AddAssign<&Array<T>> for Array<T> {
    fn add_assign(&mut self, rhs: &Array<T>) {
        self.add_assign_from(rhs);
    }
}
