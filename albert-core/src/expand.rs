//! Evaluate an identity under a substitution, summed over every way of
//! matching the occurrences of each variable to its slots.

use itertools::Itertools as _;
use rayon::prelude::*;

use crate::{
    algebra::{AlgElement, Algebra, AlgebraError},
    cancel::CancelToken,
    error::GenerateError,
    generate::{BasisPair, Equation, GenerateConfig},
    identity::{Identity, TermTree},
    ids::VarId,
    substitution::Substitution,
    typed_vec::TVec,
};

/// Per variable, the slot each occurrence reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationAssignment {
    slots: TVec<VarId, Vec<usize>>,
}

impl PermutationAssignment {
    #[must_use]
    pub fn slot(&self, var: VarId, occurrence: usize) -> usize {
        self.slots[var][occurrence]
    }
}

/// Every combination of per-variable permutations. Each variable's
/// permutations come in lexicographic order starting from the identity, and
/// the first variable varies slowest.
pub fn permutation_assignments(
    degrees: &TVec<VarId, usize>,
) -> Result<Vec<PermutationAssignment>, GenerateError> {
    const WHAT: &str = "permutation list";
    let total = degrees
        .iter()
        .try_fold(1usize, |acc, &d| (1..=d).try_fold(acc, usize::checked_mul))
        .ok_or(GenerateError::ResourceExhausted(WHAT))?;
    let mut ret = Vec::new();
    ret.try_reserve_exact(total)
        .map_err(|_| GenerateError::ResourceExhausted(WHAT))?;
    ret.extend(
        degrees
            .iter()
            .map(|&d| (0..d).permutations(d).collect_vec())
            .multi_cartesian_product()
            .map(|slots| PermutationAssignment {
                slots: slots.into(),
            }),
    );
    debug_assert_eq!(ret.len(), total);
    Ok(ret)
}

/// Evaluates one identity against substitutions, sharing the permutation list.
pub struct Expander<'a> {
    identity: &'a Identity,
    algebra: Algebra<'a>,
    assignments: Vec<PermutationAssignment>,
}

impl<'a> Expander<'a> {
    pub fn new(identity: &'a Identity, algebra: Algebra<'a>) -> Result<Self, GenerateError> {
        Ok(Self {
            identity,
            algebra,
            assignments: permutation_assignments(identity.degrees())?,
        })
    }

    #[must_use]
    pub fn assignments(&self) -> &[PermutationAssignment] {
        &self.assignments
    }

    /// The linearized identity at `substitution`: basis pairs of all
    /// permutation assignments in order, or `None` if there are none.
    ///
    /// Assignments are evaluated in batches of `config.batch_size`, in parallel
    /// unless disabled. `cancel` is polled before each batch; a batch that has
    /// started runs to completion.
    pub fn expand(
        &self,
        substitution: &Substitution,
        config: &GenerateConfig,
        cancel: &CancelToken,
    ) -> Result<Option<Equation>, GenerateError> {
        let mut terms = Vec::new();
        for batch in self.assignments.chunks(config.batch_size.max(1)) {
            cancel.check()?;
            let evaluated: Vec<Vec<BasisPair>> = if config.parallel {
                batch
                    .par_iter()
                    .map(|assignment| self.evaluate(substitution, assignment))
                    .collect::<Result<_, _>>()?
            } else {
                batch
                    .iter()
                    .map(|assignment| self.evaluate(substitution, assignment))
                    .collect::<Result<_, _>>()?
            };
            for pairs in evaluated {
                reserve(&mut terms, Some(pairs.len()), "equation")?;
                terms.extend(pairs);
            }
        }
        Ok((!terms.is_empty()).then_some(Equation { terms }))
    }

    fn evaluate(
        &self,
        substitution: &Substitution,
        assignment: &PermutationAssignment,
    ) -> Result<Vec<BasisPair>, GenerateError> {
        let field = self.algebra.field;
        let mut pairs = Vec::new();
        for term in self.identity.terms() {
            let coefficient = field.from_int(term.coefficient);
            let Some((left, right)) = term.factors() else {
                continue;
            };
            if coefficient.is_zero() {
                continue;
            }
            let left = self.eval_tree(left, substitution, assignment)?;
            let right = self.eval_tree(right, substitution, assignment)?;
            reserve(&mut pairs, left.len().checked_mul(right.len()), "basis pairs")?;
            for (l, a) in left.iter() {
                for (r, b) in right.iter() {
                    pairs.push(BasisPair {
                        coefficient: field.mul(coefficient, field.mul(a, b)),
                        left: l,
                        right: r,
                    });
                }
            }
        }
        Ok(pairs)
    }

    fn eval_tree(
        &self,
        tree: &TermTree,
        substitution: &Substitution,
        assignment: &PermutationAssignment,
    ) -> Result<AlgElement, AlgebraError> {
        match tree {
            TermTree::Leaf { var, occurrence } => Ok(AlgElement::basis(
                substitution.get(*var, assignment.slot(*var, *occurrence)),
            )),
            TermTree::Product(l, r) => {
                let l = self.eval_tree(l, substitution, assignment)?;
                let r = self.eval_tree(r, substitution, assignment)?;
                self.algebra.multiply(&l, &r)
            }
        }
    }
}

/// Room for `extra` more items, where `None` stands for an overflowed count.
fn reserve<T>(v: &mut Vec<T>, extra: Option<usize>, what: &'static str) -> Result<(), GenerateError> {
    let extra = extra.ok_or(GenerateError::ResourceExhausted(what))?;
    v.try_reserve(extra)
        .map_err(|_| GenerateError::ResourceExhausted(what))
}
