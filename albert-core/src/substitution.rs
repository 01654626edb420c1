//! Assign concrete basis elements to every occurrence slot of a set partition.

use crate::{
    basis::BasisTable,
    cancel::CancelToken,
    error::GenerateError,
    ids::{BasisId, VarId},
    partition::SetPartition,
    typed_vec::TVec,
};

/// Basis element per (variable, slot), stored row-major with one row of
/// `stride` cells per variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    stride: usize,
    lens: TVec<VarId, usize>,
    cells: Vec<BasisId>,
}

impl Substitution {
    fn for_partition(partition: &SetPartition) -> Self {
        let lens = partition.parts().map(Vec::len);
        let stride = lens.iter().copied().max().unwrap_or(0);
        Self {
            stride,
            cells: vec![BasisId::default(); stride * lens.len()],
            lens,
        }
    }
    pub fn get(&self, var: VarId, slot: usize) -> BasisId {
        debug_assert!(slot < self.lens[var]);
        self.cells[var.0 * self.stride + slot]
    }
    #[must_use]
    pub fn row(&self, var: VarId) -> &[BasisId] {
        let start = var.0 * self.stride;
        &self.cells[start..start + self.lens[var]]
    }
    fn set(&mut self, var: VarId, slot: usize, b: BasisId) {
        self.cells[var.0 * self.stride + slot] = b;
    }
}

/// Visit every substitution whose slot `(v, s)` holds a basis element of type
/// `partition.of(v)[s]`. The last slot of the last variable varies fastest.
pub fn for_each_substitution(
    basis: &BasisTable,
    partition: &SetPartition,
    cancel: &CancelToken,
    visit: impl FnMut(&Substitution) -> Result<(), GenerateError>,
) -> Result<(), GenerateError> {
    Search {
        basis,
        partition,
        cancel,
        visit,
        current: Substitution::for_partition(partition),
    }
    .fill(VarId(0), 0)
}

struct Search<'a, F> {
    basis: &'a BasisTable,
    partition: &'a SetPartition,
    cancel: &'a CancelToken,
    visit: F,
    current: Substitution,
}

impl<F> Search<'_, F>
where
    F: FnMut(&Substitution) -> Result<(), GenerateError>,
{
    fn fill(&mut self, var: VarId, slot: usize) -> Result<(), GenerateError> {
        self.cancel.check()?;
        if var.0 == self.current.lens.len() {
            return (self.visit)(&self.current);
        }
        if slot == self.current.lens[var] {
            return self.fill(VarId(var.0 + 1), 0);
        }
        let ty = self.partition.of(var)[slot];
        let mut next = self.basis.first_basis(ty);
        while let Some(b) = next {
            self.current.set(var, slot, b);
            self.fill(var, slot + 1)?;
            next = self.basis.next_same_type(b);
        }
        Ok(())
    }
}
