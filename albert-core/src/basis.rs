//! Basis elements of the algebra being built.

use std::ops::Range;

use crate::{
    ids::{BasisId, TypeName},
    typed_vec::TVec,
    types::{Type, TypeTable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasisEntry {
    /// `None` for generators.
    pub factors: Option<(BasisId, BasisId)>,
    pub type_name: TypeName,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BasisError {
    #[error("basis elements of type {0} must be entered contiguously")]
    NotContiguous(TypeName),
    #[error("type {0} is not in the type table")]
    UnknownType(TypeName),
    #[error("factor {0} is not a basis element")]
    UnknownFactor(BasisId),
}

/// Basis elements in creation order; elements of one type are contiguous.
#[derive(Debug, Clone)]
pub struct BasisTable {
    entries: TVec<BasisId, BasisEntry>,
    by_type: TVec<TypeName, Range<usize>>,
}

impl BasisTable {
    pub fn new(types: &TypeTable) -> Self {
        Self {
            entries: TVec::new(),
            by_type: TVec::new_with_size(types.len(), 0..0),
        }
    }

    /// One degree one basis element per generator present in the target.
    pub fn install_generators(&mut self, types: &TypeTable) -> Result<(), BasisError> {
        let generators = types.target().generators();
        for generator in 0..generators {
            if let Some(name) = types.name_of(&Type::unit(generators, generator)) {
                self.push(None, name)?;
            }
        }
        Ok(())
    }

    pub fn push(
        &mut self,
        factors: Option<(BasisId, BasisId)>,
        type_name: TypeName,
    ) -> Result<BasisId, BasisError> {
        if type_name.0 >= self.by_type.len() {
            return Err(BasisError::UnknownType(type_name));
        }
        if let Some((l, r)) = factors {
            for f in [l, r] {
                if f.0 >= self.entries.len() {
                    return Err(BasisError::UnknownFactor(f));
                }
            }
        }
        let next = self.entries.len();
        let range = &mut self.by_type[type_name];
        if range.is_empty() {
            *range = next..next;
        } else if range.end != next {
            return Err(BasisError::NotContiguous(type_name));
        }
        range.end = next + 1;
        Ok(self.entries.push(BasisEntry { factors, type_name }))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
    #[must_use]
    pub fn contains(&self, b: BasisId) -> bool {
        b.0 < self.entries.len()
    }
    pub fn type_of(&self, b: BasisId) -> TypeName {
        self.entries[b].type_name
    }
    #[must_use]
    pub fn factors(&self, b: BasisId) -> Option<(BasisId, BasisId)> {
        self.entries[b].factors
    }
    #[must_use]
    pub fn first_basis(&self, ty: TypeName) -> Option<BasisId> {
        let range = self.by_type.inner().get(ty.0)?;
        (!range.is_empty()).then_some(BasisId(range.start))
    }
    #[must_use]
    pub fn next_same_type(&self, b: BasisId) -> Option<BasisId> {
        let next = BasisId(b.0 + 1);
        (self.by_type[self.type_of(b)].end > next.0).then_some(next)
    }
    pub fn of_type(&self, ty: TypeName) -> impl Iterator<Item = BasisId> + use<> {
        self.by_type
            .inner()
            .get(ty.0)
            .cloned()
            .unwrap_or(0..0)
            .map(BasisId)
    }
    #[must_use]
    pub fn count_of_type(&self, ty: TypeName) -> usize {
        self.by_type.inner().get(ty.0).map_or(0, ExactSizeIterator::len)
    }
}
