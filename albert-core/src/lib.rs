//! Linearized equations from nonassociative polynomial identities.
//!
//! For an identity and a target type, [`generate_equations`] runs four nested
//! searches: split the target among the variables ([`subtypes`]), split each
//! variable's share among its occurrences ([`partition`]), pick basis elements
//! for every occurrence ([`substitution`]), and evaluate the identity over all
//! matchings of occurrences to those elements ([`expand`]). Each substitution
//! yields one equation over unknown products of basis elements.

pub mod algebra;
pub mod basis;
pub mod cancel;
pub mod error;
pub mod expand;
pub mod field;
pub mod free;
pub mod generate;
pub mod identity;
pub mod ids;
pub mod parse;
pub mod partition;
pub mod substitution;
pub mod subtypes;
pub mod typed_vec;
pub mod types;

pub use algebra::{AlgElement, Algebra, AlgebraError, MultTable};
pub use basis::BasisTable;
pub use cancel::CancelToken;
pub use error::GenerateError;
pub use field::{Field, Scalar};
pub use free::FreeAlgebra;
pub use generate::{
    BasisPair, Equation, GenerateConfig, Outcome, Stats, Status, generate_equations,
    generate_for_type,
};
pub use identity::Identity;
pub use parse::{ParseError, parse_identity};
pub use types::{Type, TypeTable};
