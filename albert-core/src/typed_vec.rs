//! TVec: Vec with typed indexes

use crate::ids::Id;
use std::{fmt::Debug, marker::PhantomData};

/// Vec with typed indexes.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TVec<K, V> {
    x: Vec<V>,
    _marker: PhantomData<K>,
}

impl<K: Id, V> Default for TVec<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
macro_rules! tvec {
    [$($tt:tt)*] => { $crate::typed_vec::TVec::from(vec![$($tt)*]) };
}
#[cfg(test)]
pub(crate) use tvec;

impl<K: Id, V: Clone> TVec<K, V> {
    /// analogous to `vec![default; n]`;
    pub fn new_with_size(n: usize, default: V) -> Self {
        Self {
            x: vec![default; n],
            _marker: PhantomData,
        }
    }
}
impl<K: Id, V> TVec<K, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            _marker: PhantomData,
        }
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.x.iter()
    }
    pub fn enumerate(&self) -> impl Iterator<Item = K> + use<K, V> {
        (0..self.len()).map(K::from)
    }
    /// `.iter().enumerate()` with typed indexes
    pub fn iter_enumerate(&self) -> impl Iterator<Item = (K, &V)> {
        (0..).map(K::from).zip(self.x.iter())
    }
    pub fn push(&mut self, v: V) -> K {
        let id = self.x.len().into();
        self.x.push(v);
        id
    }
    #[must_use]
    pub fn inner(&self) -> &[V] {
        &self.x
    }
    pub fn map<'a, V2>(&'a self, f: impl FnMut(&'a V) -> V2) -> TVec<K, V2> {
        self.iter().map(f).collect()
    }
}

impl<K, V> From<Vec<V>> for TVec<K, V> {
    fn from(x: Vec<V>) -> Self {
        Self {
            x,
            _marker: PhantomData,
        }
    }
}

impl<K: Id, V> std::ops::Index<K> for TVec<K, V> {
    type Output = V;

    fn index(&self, idx: K) -> &Self::Output {
        &self.x[idx.into()]
    }
}
impl<K: Id, V> std::ops::IndexMut<K> for TVec<K, V> {
    fn index_mut(&mut self, idx: K) -> &mut Self::Output {
        &mut self.x[idx.into()]
    }
}
impl<K: Id + Debug, V: Debug> Debug for TVec<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.iter_enumerate()).finish()
    }
}
impl<K: Id, V> FromIterator<V> for TVec<K, V> {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<V>>())
    }
}
impl<'a, K: Id, V> IntoIterator for &'a TVec<K, V> {
    type Item = &'a V;

    type IntoIter = <&'a Vec<V> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.x.iter()
    }
}
