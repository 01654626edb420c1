//! Nonassociative polynomial identities.

use std::{collections::BTreeMap, fmt};

use crate::{ids::VarId, typed_vec::TVec};

/// Nonassociative monomial over letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Word {
    Letter(char),
    Product(Box<Word>, Box<Word>),
}

impl Word {
    #[must_use]
    pub fn product(left: Word, right: Word) -> Word {
        Word::Product(Box::new(left), Box::new(right))
    }
    #[must_use]
    pub fn degree(&self) -> usize {
        match self {
            Word::Letter(_) => 1,
            Word::Product(l, r) => l.degree() + r.degree(),
        }
    }
    fn count_letters(&self, counts: &mut BTreeMap<char, usize>) {
        match self {
            Word::Letter(c) => *counts.entry(*c).or_default() += 1,
            Word::Product(l, r) => {
                l.count_letters(counts);
                r.count_letters(counts);
            }
        }
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Word::Letter(c) => write!(f, "{c}"),
            Word::Product(l, r) => {
                for w in [l, r] {
                    match **w {
                        Word::Letter(_) => write!(f, "{w}")?,
                        Word::Product(..) => write!(f, "({w})")?,
                    }
                }
                Ok(())
            }
        }
    }
}

/// A word with its letters replaced by variables. Occurrences of one variable
/// are numbered left to right starting at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermTree {
    Leaf { var: VarId, occurrence: usize },
    Product(Box<TermTree>, Box<TermTree>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub coefficient: i64,
    pub tree: TermTree,
}

impl Term {
    /// Left and right subtree of the outermost product.
    #[must_use]
    pub fn factors(&self) -> Option<(&TermTree, &TermTree)> {
        match &self.tree {
            TermTree::Leaf { .. } => None,
            TermTree::Product(l, r) => Some((l, r)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("the identity has no nonzero terms")]
    Empty,
    #[error("term {term} is not homogeneous with the first term")]
    NotHomogeneous { term: usize },
    #[error("term {term} has degree {degree}, identities need degree at least 2")]
    DegreeTooSmall { term: usize, degree: usize },
    #[error("coefficient of term {term} overflows")]
    CoefficientOverflow { term: usize },
}

/// Homogeneous linear combination of nonassociative words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    letters: TVec<VarId, char>,
    degrees: TVec<VarId, usize>,
    terms: Vec<Term>,
}

impl Identity {
    /// Terms with a zero coefficient are dropped.
    pub fn from_words(words: Vec<(i64, Word)>) -> Result<Self, IdentityError> {
        let words: Vec<_> = words.into_iter().filter(|(c, _)| *c != 0).collect();
        let Some((_, first)) = words.first() else {
            return Err(IdentityError::Empty);
        };
        let mut expected = BTreeMap::new();
        first.count_letters(&mut expected);

        for (term, (_, word)) in words.iter().enumerate() {
            let degree = word.degree();
            if degree < 2 {
                return Err(IdentityError::DegreeTooSmall { term, degree });
            }
            let mut counts = BTreeMap::new();
            word.count_letters(&mut counts);
            if counts != expected {
                return Err(IdentityError::NotHomogeneous { term });
            }
        }

        let letters: TVec<VarId, char> = expected.keys().copied().collect();
        let degrees: TVec<VarId, usize> = expected.values().copied().collect();
        let terms = words
            .iter()
            .map(|(coefficient, word)| {
                let mut seen = TVec::new_with_size(letters.len(), 0);
                Term {
                    coefficient: *coefficient,
                    tree: number_occurrences(word, &letters, &mut seen),
                }
            })
            .collect();
        Ok(Self {
            letters,
            degrees,
            terms,
        })
    }

    pub fn letters(&self) -> &TVec<VarId, char> {
        &self.letters
    }
    /// Occurrences of each variable in every term.
    pub fn degrees(&self) -> &TVec<VarId, usize> {
        &self.degrees
    }
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degrees.iter().sum()
    }

    /// Same identity with every coefficient multiplied by `c`.
    pub fn scaled(&self, c: i64) -> Result<Self, IdentityError> {
        if c == 0 {
            return Err(IdentityError::Empty);
        }
        let mut ret = self.clone();
        for (term, t) in ret.terms.iter_mut().enumerate() {
            t.coefficient = t
                .coefficient
                .checked_mul(c)
                .ok_or(IdentityError::CoefficientOverflow { term })?;
        }
        Ok(ret)
    }

    fn fmt_tree(&self, tree: &TermTree, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match tree {
            TermTree::Leaf { var, .. } => write!(f, "{}", self.letters[*var]),
            TermTree::Product(l, r) => {
                for t in [l, r] {
                    match **t {
                        TermTree::Leaf { .. } => self.fmt_tree(t, f)?,
                        TermTree::Product(..) => {
                            write!(f, "(")?;
                            self.fmt_tree(t, f)?;
                            write!(f, ")")?;
                        }
                    }
                }
                Ok(())
            }
        }
    }
}

fn number_occurrences(word: &Word, letters: &TVec<VarId, char>, seen: &mut TVec<VarId, usize>) -> TermTree {
    match word {
        Word::Letter(c) => {
            let var = letters
                .iter_enumerate()
                .find_map(|(var, l)| (l == c).then_some(var))
                .unwrap_or_default();
            let occurrence = seen[var];
            seen[var] += 1;
            TermTree::Leaf { var, occurrence }
        }
        Word::Product(l, r) => {
            let l = number_occurrences(l, letters, seen);
            let r = number_occurrences(r, letters, seen);
            TermTree::Product(Box::new(l), Box::new(r))
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, term) in self.terms.iter().enumerate() {
            let c = term.coefficient;
            match (i, c < 0) {
                (0, false) => {}
                (0, true) => write!(f, "-")?,
                (_, false) => write!(f, " + ")?,
                (_, true) => write!(f, " - ")?,
            }
            if c.unsigned_abs() != 1 {
                write!(f, "{}", c.unsigned_abs())?;
            }
            self.fmt_tree(&term.tree, f)?;
        }
        Ok(())
    }
}
