//! Types (multiplicity vectors over the generators) and their canonical names.

use std::{fmt, ops::Range, str::FromStr};

use hashbrown::HashMap;
use itertools::Itertools as _;

use crate::{ids::TypeName, typed_vec::TVec};

/// Multiplicity of each generator, in generator order.
#[must_use]
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct Type(Vec<u8>);

impl Type {
    pub fn new(multiplicities: Vec<u8>) -> Self {
        Self(multiplicities)
    }
    /// Type of the `generator`th generator among `generators`.
    pub fn unit(generators: usize, generator: usize) -> Self {
        let mut v = vec![0; generators];
        v[generator] = 1;
        Self(v)
    }
    #[must_use]
    pub fn components(&self) -> &[u8] {
        &self.0
    }
    #[must_use]
    pub fn generators(&self) -> usize {
        self.0.len()
    }
    #[must_use]
    pub fn degree(&self) -> usize {
        self.0.iter().map(|&x| usize::from(x)).sum()
    }
    #[must_use]
    pub fn is_subtype_of(&self, other: &Type) -> bool {
        self.0.len() == other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a <= b)
    }
    fn checked_sub(&self, other: &Type) -> Option<Type> {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.checked_sub(*b))
            .collect::<Option<_>>()
            .map(Type)
    }
    fn checked_add(&self, other: &Type) -> Option<Type> {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| a.checked_add(*b))
            .collect::<Option<_>>()
            .map(Type)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().join(","))
    }
}

impl FromStr for Type {
    type Err = TypeError;

    /// Accepts `3,2,1` and `(3,2,1)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s.trim();
        let inner = inner
            .strip_prefix('(')
            .and_then(|x| x.strip_suffix(')'))
            .unwrap_or(inner);
        inner
            .split(',')
            .map(|x| {
                x.trim()
                    .parse::<u8>()
                    .map_err(|_| TypeError::Parse(s.to_owned()))
            })
            .collect::<Result<Vec<u8>, _>>()
            .map(Type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TypeError {
    #[error("a type needs at least one generator")]
    NoGenerators,
    #[error("cannot parse type {0:?}, expected something like 3,2,1")]
    Parse(String),
    #[error("type {0} is not a subtype of the target")]
    NotInTable(Type),
}

/// Every subtype of a target type, named in canonical order.
///
/// Names increase with degree, and within one degree follow the
/// lexicographic order of the multiplicity vectors (first generator most
/// significant). In particular a name of lower degree always compares below
/// a name of higher degree, which the set partition search relies on.
#[derive(Debug, Clone)]
pub struct TypeTable {
    target: Type,
    types: TVec<TypeName, Type>,
    names: HashMap<Type, TypeName>,
    by_degree: Vec<Range<usize>>,
}

impl TypeTable {
    pub fn new(target: Type) -> Result<Self, TypeError> {
        if target.generators() == 0 {
            return Err(TypeError::NoGenerators);
        }
        let mut all: Vec<Type> = target
            .0
            .iter()
            .map(|&t| 0..=t)
            .multi_cartesian_product()
            .map(Type)
            .collect();
        all.sort_by_key(Type::degree);

        let mut by_degree = vec![0..0; target.degree() + 1];
        for (i, ty) in all.iter().enumerate() {
            let range = &mut by_degree[ty.degree()];
            if range.is_empty() {
                *range = i..i;
            }
            range.end = i + 1;
        }
        let types: TVec<TypeName, Type> = all.into();
        let names = types
            .iter_enumerate()
            .map(|(name, ty)| (ty.clone(), name))
            .collect();

        tracing::debug!("type table for {target} has {} names", types.len());
        Ok(Self {
            target,
            types,
            names,
            by_degree,
        })
    }

    pub fn target(&self) -> &Type {
        &self.target
    }
    pub fn target_name(&self) -> TypeName {
        TypeName(self.types.len() - 1)
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
    #[must_use]
    pub fn contains(&self, name: TypeName) -> bool {
        name.0 < self.types.len()
    }
    pub fn type_of(&self, name: TypeName) -> &Type {
        &self.types[name]
    }
    #[must_use]
    pub fn name_of(&self, ty: &Type) -> Option<TypeName> {
        self.names.get(ty).copied()
    }
    #[must_use]
    pub fn degree(&self, name: TypeName) -> usize {
        self.types[name].degree()
    }
    /// Whether `a` is componentwise at most `b`.
    #[must_use]
    pub fn is_subtype(&self, a: TypeName, b: TypeName) -> bool {
        self.types[a].is_subtype_of(&self.types[b])
    }
    /// `a - b`, if `b` is a subtype of `a`.
    #[must_use]
    pub fn subtract(&self, a: TypeName, b: TypeName) -> Option<TypeName> {
        let diff = self.types[a].checked_sub(&self.types[b])?;
        self.name_of(&diff)
    }
    /// `a + b`, if the sum is still a subtype of the target.
    #[must_use]
    pub fn add(&self, a: TypeName, b: TypeName) -> Option<TypeName> {
        let sum = self.types[a].checked_add(&self.types[b])?;
        self.name_of(&sum)
    }
    #[must_use]
    pub fn first_of_degree(&self, degree: usize) -> Option<TypeName> {
        let range = self.by_degree.get(degree)?;
        (!range.is_empty()).then_some(TypeName(range.start))
    }
    #[must_use]
    pub fn next_same_degree(&self, name: TypeName) -> Option<TypeName> {
        let next = TypeName(name.0 + 1);
        (self.contains(next) && self.degree(next) == self.degree(name)).then_some(next)
    }
    /// Names of one degree, ascending.
    pub fn of_degree(&self, degree: usize) -> impl Iterator<Item = TypeName> + use<> {
        self.by_degree
            .get(degree)
            .cloned()
            .unwrap_or(0..0)
            .map(TypeName)
    }
    pub fn names(&self) -> impl Iterator<Item = TypeName> + use<> {
        self.types.enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;
    use itertools::Itertools as _;

    fn table(s: &str) -> TypeTable {
        TypeTable::new(s.parse().unwrap()).unwrap()
    }

    fn show(types: &TypeTable, names: impl Iterator<Item = TypeName>) -> String {
        names.map(|n| types.type_of(n).to_string()).join(" ")
    }

    #[test]
    fn degree_two_names_in_order() {
        let types = table("3,2,1");
        expect!["(0,1,1) (0,2,0) (1,0,1) (1,1,0) (2,0,0)"]
            .assert_eq(&show(&types, types.of_degree(2)));
        expect!["(2,2,1) (3,1,1) (3,2,0)"].assert_eq(&show(&types, types.of_degree(5)));
    }

    #[test]
    fn walk_by_first_and_next() {
        let types = table("(2,1)");
        let mut walked = Vec::new();
        for degree in 0..=3 {
            let mut next = types.first_of_degree(degree);
            while let Some(name) = next {
                walked.push(name);
                next = types.next_same_degree(name);
            }
        }
        assert_eq!(walked, types.names().collect_vec());
        assert_eq!(types.first_of_degree(4), None);
        expect!["(0,0) (0,1) (1,0) (1,1) (2,0) (2,1)"].assert_eq(&show(&types, types.names()));
    }

    #[test]
    fn names_are_consistent_with_degree() {
        let types = table("3,2,1");
        assert_eq!(types.len(), 4 * 3 * 2);
        for (a, b) in types.names().tuple_windows() {
            assert!(types.degree(a) <= types.degree(b));
        }
        assert_eq!(types.type_of(types.target_name()), types.target());
    }

    #[test]
    fn arithmetic_on_names() {
        let types = table("3,2,1");
        let n = |s: &str| types.name_of(&s.parse().unwrap()).unwrap();
        assert_eq!(types.subtract(n("3,2,1"), n("1,0,1")), Some(n("2,2,0")));
        assert_eq!(types.subtract(n("1,0,0"), n("0,1,0")), None);
        assert_eq!(types.add(n("1,0,0"), n("0,1,0")), Some(n("1,1,0")));
        assert_eq!(types.add(n("3,0,0"), n("1,0,0")), None);
        assert!(types.is_subtype(n("1,1,0"), n("1,2,1")));
        assert!(!types.is_subtype(n("2,0,0"), n("1,2,1")));
        assert_eq!(types.name_of(&Type::new(vec![1, 1])), None);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            "3,x".parse::<Type>(),
            Err(TypeError::Parse("3,x".to_owned()))
        );
        assert_eq!(
            TypeTable::new(Type::new(Vec::new())).unwrap_err(),
            TypeError::NoGenerators
        );
    }
}
