//! Split a target type among the variables of an identity.
//!
//! Every assignment `t_1..t_m` of types to variables with `t_1 + .. + t_m`
//! equal to the target and `degree(t_i) >= d_i` is produced exactly once.
//! The search fills a variables-by-generators grid column by column; within
//! a column every variable but the last tries each value of what is left of
//! that column, largest first, and the last variable takes the rest.

use crate::{
    cancel::CancelToken,
    error::GenerateError,
    ids::{TypeName, VarId},
    typed_vec::TVec,
    types::{Type, TypeError, TypeTable},
};

pub fn for_each_sequential_subtype(
    types: &TypeTable,
    target: TypeName,
    min_degrees: &TVec<VarId, usize>,
    cancel: &CancelToken,
    visit: impl FnMut(&TVec<VarId, TypeName>) -> Result<(), GenerateError>,
) -> Result<(), GenerateError> {
    let vars = min_degrees.len();
    let target = types.type_of(target);
    if vars == 0 || min_degrees.iter().sum::<usize>() > target.degree() {
        return Ok(());
    }
    Search {
        types,
        target: target.components(),
        min_degrees,
        cancel,
        visit,
        grid: TVec::new_with_size(vars, vec![0; target.generators()]),
        degrees: TVec::new_with_size(vars, 0),
        unassigned: target.degree(),
        names: TVec::new_with_size(vars, TypeName::default()),
    }
    .step(VarId(0), 0, 0)
}

struct Search<'a, F> {
    types: &'a TypeTable,
    target: &'a [u8],
    min_degrees: &'a TVec<VarId, usize>,
    cancel: &'a CancelToken,
    visit: F,

    grid: TVec<VarId, Vec<u8>>,
    degrees: TVec<VarId, usize>,
    unassigned: usize,
    names: TVec<VarId, TypeName>,
}

impl<F> Search<'_, F>
where
    F: FnMut(&TVec<VarId, TypeName>) -> Result<(), GenerateError>,
{
    /// Fill cell (`var`, `col`). Earlier variables took `weight` of this column.
    fn step(&mut self, var: VarId, col: usize, weight: u8) -> Result<(), GenerateError> {
        self.cancel.check()?;
        if col == self.target.len() {
            return self.emit();
        }
        let remainder = self.target[col] - weight;
        if var.0 + 1 == self.grid.len() {
            return self.place(var, col, remainder, weight);
        }
        for value in (0..=remainder).rev() {
            self.place(var, col, value, weight)?;
        }
        Ok(())
    }

    fn place(&mut self, var: VarId, col: usize, value: u8, weight: u8) -> Result<(), GenerateError> {
        self.grid[var][col] = value;
        self.degrees[var] += usize::from(value);
        self.unassigned -= usize::from(value);

        let ret = if !self.feasible(var, col) {
            Ok(())
        } else if var.0 + 1 == self.grid.len() {
            self.step(VarId(0), col + 1, 0)
        } else {
            self.step(VarId(var.0 + 1), col, weight + value)
        };

        self.unassigned += usize::from(value);
        self.degrees[var] -= usize::from(value);
        self.grid[var][col] = 0;
        ret
    }

    fn feasible(&self, var: VarId, col: usize) -> bool {
        if col + 1 == self.target.len() && self.degrees[var] < self.min_degrees[var] {
            return false;
        }
        let deficit: usize = self
            .degrees
            .iter()
            .zip(self.min_degrees)
            .map(|(have, need)| need.saturating_sub(*have))
            .sum();
        deficit <= self.unassigned
    }

    fn emit(&mut self) -> Result<(), GenerateError> {
        for var in self.grid.enumerate() {
            let ty = Type::new(self.grid[var].clone());
            self.names[var] = self.types.name_of(&ty).ok_or(TypeError::NotInTable(ty))?;
        }
        (self.visit)(&self.names)
    }
}
