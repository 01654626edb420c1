//! The free nonassociative algebra, truncated at some degree.
//!
//! Every product of basis elements is a new basis element, so the
//! multiplication table is known without solving anything. Good as a
//! consistent stand-in for a partially built algebra.

use crate::{
    algebra::{AlgElement, Algebra, AlgebraError, MultTable},
    basis::BasisTable,
    field::Field,
    types::{Type, TypeTable},
};

#[derive(Debug, Clone)]
pub struct FreeAlgebra {
    pub field: Field,
    pub types: TypeTable,
    pub basis: BasisTable,
    pub table: MultTable,
}

impl FreeAlgebra {
    /// Over the default field.
    pub fn new(target: Type, max_degree: usize) -> Result<Self, AlgebraError> {
        Self::with_field(Field::default(), target, max_degree)
    }

    pub fn with_field(field: Field, target: Type, max_degree: usize) -> Result<Self, AlgebraError> {
        let types = TypeTable::new(target)?;
        let mut basis = BasisTable::new(&types);
        basis.install_generators(&types)?;
        let mut table = MultTable::new();

        for degree in 2..=max_degree.min(types.target().degree()) {
            for ty in types.of_degree(degree) {
                for left_ty in (1..degree).flat_map(|d| types.of_degree(d)) {
                    let Some(right_ty) = types.subtract(ty, left_ty) else {
                        continue;
                    };
                    for left in basis.of_type(left_ty) {
                        for right in basis.of_type(right_ty) {
                            let product = basis.push(Some((left, right)), ty)?;
                            table.enter_product(&types, &basis, left, right, AlgElement::basis(product))?;
                        }
                    }
                }
            }
        }
        tracing::debug!(
            "free algebra on {} up to degree {max_degree}: {} basis elements, {} products",
            types.target(),
            basis.len(),
            table.len()
        );
        Ok(Self {
            field,
            types,
            basis,
            table,
        })
    }

    pub fn algebra(&self) -> Algebra<'_> {
        Algebra {
            field: &self.field,
            types: &self.types,
            basis: &self.basis,
            table: &self.table,
        }
    }
}
