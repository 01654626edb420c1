//! Algebra elements and multiplication through a partially known table.

use std::collections::BTreeMap;

use hashbrown::HashMap;

use crate::{
    basis::{BasisError, BasisTable},
    field::{Field, Scalar},
    ids::{BasisId, TypeName},
    types::{TypeError, TypeTable},
};

/// Sparse linear combination of basis elements. Zero coefficients are never stored.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlgElement {
    terms: BTreeMap<BasisId, Scalar>,
}

impl AlgElement {
    pub fn zero() -> Self {
        Self::default()
    }
    pub fn basis(b: BasisId) -> Self {
        Self {
            terms: BTreeMap::from([(b, Scalar::ONE)]),
        }
    }
    pub fn get(&self, b: BasisId) -> Scalar {
        self.terms.get(&b).copied().unwrap_or_default()
    }
    pub fn set(&mut self, b: BasisId, x: Scalar) {
        if x.is_zero() {
            self.terms.remove(&b);
        } else {
            self.terms.insert(b, x);
        }
    }
    /// `self += x * b`
    pub fn accumulate(&mut self, field: &Field, b: BasisId, x: Scalar) {
        let sum = field.add(self.get(b), x);
        self.set(b, sum);
    }
    pub fn add_assign(&mut self, field: &Field, other: &AlgElement) {
        for (b, x) in other.iter() {
            self.accumulate(field, b, x);
        }
    }
    pub fn scale(&self, field: &Field, x: Scalar) -> Self {
        let mut ret = Self::zero();
        for (b, y) in self.iter() {
            ret.set(b, field.mul(x, y));
        }
        ret
    }
    /// Terms in basis order.
    pub fn iter(&self) -> impl Iterator<Item = (BasisId, Scalar)> + '_ {
        self.terms.iter().map(|(&b, &x)| (b, x))
    }
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.is_zero()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlgebraError {
    #[error("product {left} * {right} is not in the multiplication table")]
    UnknownProduct { left: BasisId, right: BasisId },
    #[error("{0} is not a basis element")]
    UnknownBasis(BasisId),
    #[error("product {left} * {right} cannot contain {term} of type {found}, expected {expected:?}")]
    TypeMismatch {
        left: BasisId,
        right: BasisId,
        term: BasisId,
        found: TypeName,
        expected: Option<TypeName>,
    },
    #[error(transparent)]
    Basis(#[from] BasisError),
    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Known products of pairs of basis elements.
#[derive(Debug, Clone, Default)]
pub struct MultTable {
    products: HashMap<(BasisId, BasisId), AlgElement>,
}

impl MultTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `left * right = product`. Every term of the product must have
    /// the type `type(left) + type(right)`.
    pub fn enter_product(
        &mut self,
        types: &TypeTable,
        basis: &BasisTable,
        left: BasisId,
        right: BasisId,
        product: AlgElement,
    ) -> Result<(), AlgebraError> {
        for b in [left, right] {
            if !basis.contains(b) {
                return Err(AlgebraError::UnknownBasis(b));
            }
        }
        let expected = types.add(basis.type_of(left), basis.type_of(right));
        for (term, _) in product.iter() {
            if !basis.contains(term) {
                return Err(AlgebraError::UnknownBasis(term));
            }
            let found = basis.type_of(term);
            if Some(found) != expected {
                return Err(AlgebraError::TypeMismatch {
                    left,
                    right,
                    term,
                    found,
                    expected,
                });
            }
        }
        self.products.insert((left, right), product);
        Ok(())
    }

    #[must_use]
    pub fn product(&self, left: BasisId, right: BasisId) -> Option<&AlgElement> {
        self.products.get(&(left, right))
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Read-only view of everything needed to multiply algebra elements.
///
/// Holding shared borrows keeps the table frozen for as long as equations are
/// being generated from it.
#[derive(Debug, Clone, Copy)]
pub struct Algebra<'a> {
    pub field: &'a Field,
    pub types: &'a TypeTable,
    pub basis: &'a BasisTable,
    pub table: &'a MultTable,
}

impl Algebra<'_> {
    pub fn multiply(&self, a: &AlgElement, b: &AlgElement) -> Result<AlgElement, AlgebraError> {
        let mut ret = AlgElement::zero();
        for (left, x) in a.iter() {
            for (right, y) in b.iter() {
                let product = self
                    .table
                    .product(left, right)
                    .ok_or(AlgebraError::UnknownProduct { left, right })?;
                let xy = self.field.mul(x, y);
                for (term, z) in product.iter() {
                    ret.accumulate(self.field, term, self.field.mul(xy, z));
                }
            }
        }
        Ok(ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_arithmetic_drops_zeros() {
        let field = Field::new(7).unwrap();
        let mut a = AlgElement::basis(BasisId(3));
        a.accumulate(&field, BasisId(1), field.from_int(2));
        assert_eq!(a.iter().collect::<Vec<_>>(), [
            (BasisId(1), field.from_int(2)),
            (BasisId(3), Scalar::ONE),
        ]);
        a.accumulate(&field, BasisId(3), field.from_int(6));
        assert_eq!(a.len(), 1);
        assert_eq!(a.get(BasisId(3)), Scalar::ZERO);

        let b = a.scale(&field, field.from_int(4));
        assert_eq!(b.get(BasisId(1)), Scalar::ONE);
        let mut c = b.clone();
        c.add_assign(&field, &b.scale(&field, field.from_int(-1)));
        assert!(c.is_zero());
    }

    #[test]
    fn multiply_through_table() {
        let field = Field::default();
        let types = TypeTable::new("2,0".parse().unwrap()).unwrap();
        let mut basis = BasisTable::new(&types);
        basis.install_generators(&types).unwrap();
        let x = BasisId(0);
        let xx_type = types.name_of(&"2,0".parse().unwrap()).unwrap();
        let xx = basis.push(Some((x, x)), xx_type).unwrap();
        let mut table = MultTable::new();
        assert_eq!(
            table.enter_product(&types, &basis, x, x, AlgElement::basis(x)),
            Err(AlgebraError::TypeMismatch {
                left: x,
                right: x,
                term: x,
                found: basis.type_of(x),
                expected: Some(xx_type),
            })
        );
        table
            .enter_product(&types, &basis, x, x, AlgElement::basis(xx).scale(&field, field.from_int(3)))
            .unwrap();
        let algebra = Algebra {
            field: &field,
            types: &types,
            basis: &basis,
            table: &table,
        };
        let two_x = AlgElement::basis(x).scale(&field, field.from_int(2));
        let p = algebra.multiply(&two_x, &two_x).unwrap();
        assert_eq!(p.iter().collect::<Vec<_>>(), [(xx, field.from_int(12))]);
        assert_eq!(
            algebra.multiply(&AlgElement::basis(xx), &AlgElement::basis(x)),
            Err(AlgebraError::UnknownProduct { left: xx, right: x })
        );
    }
}
