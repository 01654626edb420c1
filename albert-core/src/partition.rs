//! Split each variable's type into one part per occurrence.

use itertools::Itertools as _;

use crate::{
    cancel::CancelToken,
    error::GenerateError,
    ids::{TypeName, VarId},
    typed_vec::TVec,
    types::TypeTable,
};

/// Per variable, one type per occurrence slot. Parts are non-increasing in
/// name order, so each multiset of parts appears once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetPartition {
    parts: TVec<VarId, Vec<TypeName>>,
}

impl SetPartition {
    #[must_use]
    pub fn parts(&self) -> &TVec<VarId, Vec<TypeName>> {
        &self.parts
    }
    #[must_use]
    pub fn of(&self, var: VarId) -> &[TypeName] {
        &self.parts[var]
    }
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.parts
            .iter()
            .all(|parts| parts.iter().tuple_windows().all(|(a, b)| a >= b))
    }
    #[must_use]
    pub fn dbg_summary(&self, types: &TypeTable) -> String {
        self.parts
            .iter()
            .map(|parts| parts.iter().map(|&n| types.type_of(n)).join(" "))
            .join(" | ")
    }
}

/// Visit every canonical set partition of `subtypes`, variable `v` split into
/// `degrees[v]` parts.
///
/// The first part of a type of degree `n` split `d` ways has degree in
/// `ceil(n/d)..=n-d+1`; later parts are bounded above by the part before them.
pub fn for_each_set_partition(
    types: &TypeTable,
    subtypes: &TVec<VarId, TypeName>,
    degrees: &TVec<VarId, usize>,
    cancel: &CancelToken,
    visit: impl FnMut(&SetPartition) -> Result<(), GenerateError>,
) -> Result<(), GenerateError> {
    assert_eq!(subtypes.len(), degrees.len());
    let Some(&first) = subtypes.inner().first() else {
        return Ok(());
    };
    Search {
        types,
        subtypes,
        degrees,
        cancel,
        visit,
        partition: SetPartition {
            parts: degrees.map(|&d| Vec::with_capacity(d)),
        },
    }
    .split(VarId(0), first, degrees[VarId(0)], None)
}

struct Search<'a, F> {
    types: &'a TypeTable,
    subtypes: &'a TVec<VarId, TypeName>,
    degrees: &'a TVec<VarId, usize>,
    cancel: &'a CancelToken,
    visit: F,
    partition: SetPartition,
}

impl<F> Search<'_, F>
where
    F: FnMut(&SetPartition) -> Result<(), GenerateError>,
{
    /// Split `residual` of variable `var` into `count` more parts, none above `bound`.
    fn split(
        &mut self,
        var: VarId,
        residual: TypeName,
        count: usize,
        bound: Option<TypeName>,
    ) -> Result<(), GenerateError> {
        self.cancel.check()?;
        let n = self.types.degree(residual);
        if count == 0 || n < count {
            return Ok(());
        }
        if count == 1 {
            if bound.is_some_and(|b| residual > b) {
                return Ok(());
            }
            return self.with_part(var, residual, Self::next_variable);
        }
        for degree in n.div_ceil(count)..=n + 1 - count {
            for part in self.types.of_degree(degree) {
                // Names grow with degree, so nothing later fits under the bound.
                if bound.is_some_and(|b| part > b) {
                    return Ok(());
                }
                let Some(rest) = self.types.subtract(residual, part) else {
                    continue;
                };
                self.with_part(var, part, |this, var| {
                    this.split(var, rest, count - 1, Some(part))
                })?;
            }
        }
        Ok(())
    }

    fn next_variable(&mut self, var: VarId) -> Result<(), GenerateError> {
        let next = VarId(var.0 + 1);
        if next.0 == self.subtypes.len() {
            self.emit()
        } else {
            self.split(next, self.subtypes[next], self.degrees[next], None)
        }
    }

    fn with_part(
        &mut self,
        var: VarId,
        part: TypeName,
        then: impl FnOnce(&mut Self, VarId) -> Result<(), GenerateError>,
    ) -> Result<(), GenerateError> {
        self.partition.parts[var].push(part);
        let ret = then(self, var);
        self.partition.parts[var].pop();
        ret
    }

    fn emit(&mut self) -> Result<(), GenerateError> {
        if !self.partition.is_canonical() {
            return Ok(());
        }
        (self.visit)(&self.partition)
    }
}
