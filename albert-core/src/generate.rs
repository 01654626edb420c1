//! Identity to linearized equations.

use std::{fmt, ops::AddAssign, time::Instant};

use itertools::Itertools as _;

use crate::{
    algebra::Algebra,
    cancel::CancelToken,
    error::GenerateError,
    expand::Expander,
    field::Scalar,
    identity::Identity,
    ids::{BasisId, TypeName},
    partition::for_each_set_partition,
    substitution::for_each_substitution,
    subtypes::for_each_sequential_subtype,
};

/// `coefficient * (left * right)`, an unknown product of the multiplication table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BasisPair {
    pub coefficient: Scalar,
    pub left: BasisId,
    pub right: BasisId,
}

/// Basis pairs summing to zero. Repeated pairs are kept as they are.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Equation {
    pub terms: Vec<BasisPair>,
}

impl Equation {
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            self.terms
                .iter()
                .map(|p| format!("{} {}*{}", p.coefficient, p.left, p.right))
                .join(" + ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Evaluate permutation assignments on the rayon pool.
    pub parallel: bool,
    /// Use a dedicated pool of this many threads instead of the global one.
    pub threads: Option<usize>,
    /// Permutation assignments per batch. Cancellation is checked between batches.
    pub batch_size: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            threads: None,
            batch_size: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub subtypes: usize,
    pub partitions: usize,
    pub substitutions: usize,
    pub permutations: usize,
    pub equations: usize,
    pub basis_pairs: usize,
}

impl AddAssign for Stats {
    fn add_assign(&mut self, other: Self) {
        self.subtypes += other.subtypes;
        self.partitions += other.partitions;
        self.substitutions += other.substitutions;
        self.permutations += other.permutations;
        self.equations += other.equations;
        self.basis_pairs += other.basis_pairs;
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            subtypes,
            partitions,
            substitutions,
            permutations,
            equations,
            basis_pairs,
        } = self;
        write!(
            f,
            "{subtypes} subtypes, {partitions} partitions, {substitutions} substitutions, \
             {permutations} permutations, {equations} equations, {basis_pairs} basis pairs"
        )
    }
}

#[derive(Debug)]
pub enum Status {
    Complete,
    /// Finished, but nothing applied.
    Empty,
    /// Equations of the sequential subtypes finished before cancellation are kept.
    Cancelled,
    /// No equations are kept.
    Failed(GenerateError),
}

#[derive(Debug)]
pub struct Outcome {
    pub status: Status,
    pub equations: Vec<Equation>,
    pub stats: Stats,
}

impl Outcome {
    fn finish(result: Result<(), GenerateError>, mut equations: Vec<Equation>, mut stats: Stats) -> Self {
        let status = match result {
            Ok(()) if equations.is_empty() => Status::Empty,
            Ok(()) => Status::Complete,
            Err(GenerateError::Cancelled) => Status::Cancelled,
            Err(err) => {
                equations.clear();
                Status::Failed(err)
            }
        };
        stats.equations = equations.len();
        stats.basis_pairs = equations.iter().map(Equation::len).sum();
        Self {
            status,
            equations,
            stats,
        }
    }
}

/// All equations `identity` imposes on products of total type `target`.
///
/// Equations come in the order sequential subtype, set partition,
/// substitution, and are independent of the number of threads.
pub fn generate_equations(
    identity: &Identity,
    target: TypeName,
    algebra: Algebra<'_>,
    config: &GenerateConfig,
    cancel: &CancelToken,
) -> Outcome {
    in_pool(config, || generate_one(identity, target, algebra, config, cancel))
        .unwrap_or_else(|err| Outcome::finish(Err(err), Vec::new(), Stats::default()))
}

/// Runs `f` on a pool of `config.threads` threads, or on the current pool.
fn in_pool<R: Send>(
    config: &GenerateConfig,
    f: impl FnOnce() -> R + Send,
) -> Result<R, GenerateError> {
    match config.threads {
        None => Ok(f()),
        Some(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()?;
            Ok(pool.install(f))
        }
    }
}

fn generate_one(
    identity: &Identity,
    target: TypeName,
    algebra: Algebra<'_>,
    config: &GenerateConfig,
    cancel: &CancelToken,
) -> Outcome {
    let _span = tracing::info_span!("generate", %identity, %target).entered();
    let start = Instant::now();

    let mut equations = Vec::new();
    let mut stats = Stats::default();
    let result = run(identity, target, algebra, config, cancel, &mut equations, &mut stats);
    let outcome = Outcome::finish(result, equations, stats);

    tracing::info!(
        "{:?} with {} in {:.1} ms",
        outcome.status,
        outcome.stats,
        start.elapsed().as_secs_f64() * 1000.0
    );
    outcome
}

fn run(
    identity: &Identity,
    target: TypeName,
    algebra: Algebra<'_>,
    config: &GenerateConfig,
    cancel: &CancelToken,
    equations: &mut Vec<Equation>,
    stats: &mut Stats,
) -> Result<(), GenerateError> {
    let types = algebra.types;
    if !types.contains(target) {
        return Err(GenerateError::UnknownTarget(target));
    }
    let expander = Expander::new(identity, algebra)?;
    let degrees = identity.degrees();

    let mut completed = 0;
    let ret = for_each_sequential_subtype(types, target, degrees, cancel, |subtypes| {
        stats.subtypes += 1;
        tracing::debug!(
            "subtype {}",
            subtypes.iter().map(|&n| types.type_of(n)).join(" + ")
        );
        for_each_set_partition(types, subtypes, degrees, cancel, |partition| {
            stats.partitions += 1;
            tracing::trace!("partition {}", partition.dbg_summary(types));
            for_each_substitution(algebra.basis, partition, cancel, |substitution| {
                stats.substitutions += 1;
                let equation = expander.expand(substitution, config, cancel)?;
                stats.permutations += expander.assignments().len();
                if let Some(equation) = equation {
                    equations
                        .try_reserve(1)
                        .map_err(|_| GenerateError::ResourceExhausted("equation list"))?;
                    equations.push(equation);
                }
                Ok(())
            })
        })?;
        completed = equations.len();
        Ok(())
    });
    if matches!(ret, Err(GenerateError::Cancelled)) {
        equations.truncate(completed);
    }
    ret
}

/// Every identity of degree at most the degree of `target`, in order. Stops at
/// the first identity that is cancelled or fails, keeping what earlier
/// identities produced.
pub fn generate_for_type(
    identities: &[Identity],
    target: TypeName,
    algebra: Algebra<'_>,
    config: &GenerateConfig,
    cancel: &CancelToken,
) -> Outcome {
    if !algebra.types.contains(target) {
        return Outcome::finish(Err(GenerateError::UnknownTarget(target)), Vec::new(), Stats::default());
    }
    let degree = algebra.types.degree(target);
    let all = || {
        let mut equations = Vec::new();
        let mut stats = Stats::default();
        for identity in identities.iter().filter(|id| id.degree() <= degree) {
            let outcome = generate_one(identity, target, algebra, config, cancel);
            stats += outcome.stats;
            equations.extend(outcome.equations);
            match outcome.status {
                Status::Complete | Status::Empty => {}
                status => {
                    return Outcome {
                        status,
                        equations,
                        stats,
                    };
                }
            }
        }
        Outcome::finish(Ok(()), equations, stats)
    };
    in_pool(config, all)
        .unwrap_or_else(|err| Outcome::finish(Err(err), Vec::new(), Stats::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algebra::AlgebraError, free::FreeAlgebra, parse::parse_identity};
    use expect_test::expect;

    fn free_below(target: &str) -> FreeAlgebra {
        let target: crate::types::Type = target.parse().unwrap();
        let degree = target.degree();
        FreeAlgebra::new(target, degree - 1).unwrap()
    }

    fn generate(identity: &str, free: &FreeAlgebra, config: &GenerateConfig) -> Outcome {
        generate_equations(
            &parse_identity(identity).unwrap(),
            free.types.target_name(),
            free.algebra(),
            config,
            &CancelToken::new(),
        )
    }

    fn show(outcome: &Outcome) -> String {
        outcome.equations.iter().join("\n")
    }

    #[test]
    fn commutativity() {
        let free = free_below("1,1");
        let outcome = generate("xy - yx", &free, &GenerateConfig::default());
        assert!(matches!(outcome.status, Status::Complete));
        expect![[r#"
            1 b0*b1 + 250 b1*b0
            1 b1*b0 + 250 b0*b1"#]]
        .assert_eq(&show(&outcome));
    }

    #[test]
    fn permutations_share_one_equation() {
        let free = free_below("3");
        let outcome = generate("(xx)x - x(xx)", &free, &GenerateConfig::default());
        expect!["1 b1*b0 + 250 b0*b1 + 1 b1*b0 + 250 b0*b1 + 1 b1*b0 + 250 b0*b1 + 1 b1*b0 + 250 b0*b1 + 1 b1*b0 + 250 b0*b1 + 1 b1*b0 + 250 b0*b1"]
            .assert_eq(&show(&outcome));
        assert_eq!(outcome.stats.permutations, 6);
    }

    #[test]
    fn two_variables_with_repeated_occurrences() {
        let free = free_below("2,1");
        let outcome = generate("(xx)y - x(xy)", &free, &GenerateConfig::default());
        expect![[r#"
            1 b4*b1 + 250 b0*b3 + 1 b4*b1 + 250 b0*b3
            1 b3*b0 + 250 b0*b2 + 1 b2*b0 + 250 b1*b4"#]]
        .assert_eq(&show(&outcome));
        expect!["2 subtypes, 2 partitions, 2 substitutions, 4 permutations, 2 equations, 8 basis pairs"]
            .assert_eq(&outcome.stats.to_string());
    }

    #[test]
    fn scaling_the_identity_scales_every_coefficient() {
        let free = free_below("2,2");
        let identity = parse_identity("(xy)x - x(yx) + 2(xx)y").unwrap();
        let config = GenerateConfig::default();
        let run = |identity: &Identity| {
            generate_equations(identity, free.types.target_name(), free.algebra(), &config, &CancelToken::new())
        };
        let plain = run(&identity);
        let scaled = run(&identity.scaled(3).unwrap());
        let three = free.field.from_int(3);
        assert!(!plain.equations.is_empty());
        assert_eq!(plain.equations.len(), scaled.equations.len());
        for (a, b) in plain.equations.iter().zip(&scaled.equations) {
            assert_eq!(a.len(), b.len());
            for (x, y) in a.terms.iter().zip(&b.terms) {
                assert_eq!((x.left, x.right), (y.left, y.right));
                assert_eq!(free.field.mul(three, x.coefficient), y.coefficient);
            }
        }
    }

    #[test]
    fn deterministic_across_thread_configurations() {
        let free = free_below("3,2");
        let identity = "((xx)y)x - (xx)(yx)";
        let reference = generate(identity, &free, &GenerateConfig {
            parallel: false,
            ..GenerateConfig::default()
        });
        assert!(matches!(reference.status, Status::Complete));
        for config in [
            GenerateConfig::default(),
            GenerateConfig {
                threads: Some(3),
                batch_size: 1,
                ..GenerateConfig::default()
            },
            GenerateConfig {
                batch_size: 5,
                ..GenerateConfig::default()
            },
        ] {
            let outcome = generate(identity, &free, &config);
            assert_eq!(outcome.equations, reference.equations, "{config:?}");
            assert_eq!(outcome.stats, reference.stats);
        }
    }

    #[test]
    fn cancellation_keeps_a_prefix() {
        let free = free_below("2,2");
        let identity = parse_identity("(xy)(xy) - x(y(xy))").unwrap();
        let config = GenerateConfig {
            batch_size: 1,
            ..GenerateConfig::default()
        };
        let target = free.types.target_name();
        let full = generate_equations(&identity, target, free.algebra(), &config, &CancelToken::new());
        assert!(matches!(full.status, Status::Complete));

        let mut saw_partial = false;
        for budget in 0.. {
            let cancel = CancelToken::with_poll_budget(budget);
            let outcome = generate_equations(&identity, target, free.algebra(), &config, &cancel);
            match outcome.status {
                Status::Cancelled => {
                    assert!(full.equations.starts_with(&outcome.equations), "budget {budget}");
                    saw_partial |= !outcome.equations.is_empty();
                }
                Status::Complete => {
                    assert_eq!(outcome.equations, full.equations);
                    break;
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(saw_partial);
    }

    #[test]
    fn empty_and_failed_outcomes() {
        let free = free_below("1,1");
        let outcome = generate("(xx)y - x(xy)", &free, &GenerateConfig::default());
        assert!(matches!(outcome.status, Status::Empty));

        let shallow = FreeAlgebra::new("2,1".parse().unwrap(), 1).unwrap();
        let outcome = generate("(xx)y - x(xy)", &shallow, &GenerateConfig::default());
        assert!(matches!(
            outcome.status,
            Status::Failed(GenerateError::Algebra(AlgebraError::UnknownProduct { .. }))
        ));
        assert!(outcome.equations.is_empty());

        let outcome = generate_equations(
            &parse_identity("xy - yx").unwrap(),
            TypeName(1000),
            free.algebra(),
            &GenerateConfig::default(),
            &CancelToken::new(),
        );
        assert!(matches!(
            outcome.status,
            Status::Failed(GenerateError::UnknownTarget(TypeName(1000)))
        ));
    }

    #[test]
    fn several_identities_for_one_type() {
        let free = free_below("2,1");
        let identities = ["xy - yx", "(xx)y - x(xy)", "((xx)x)y - x(x(xy))"]
            .map(|s| parse_identity(s).unwrap());
        let config = GenerateConfig::default();
        let target = free.types.target_name();
        let all = generate_for_type(&identities, target, free.algebra(), &config, &CancelToken::new());
        assert!(matches!(all.status, Status::Complete));

        let mut expected = Vec::new();
        for identity in &identities[..2] {
            expected.extend(
                generate_equations(identity, target, free.algebra(), &config, &CancelToken::new()).equations,
            );
        }
        assert_eq!(all.equations, expected);
        assert_eq!(all.stats.equations, expected.len());
    }

    #[test]
    fn dedicated_pool_serves_every_identity() {
        let pooled = GenerateConfig {
            threads: Some(2),
            ..GenerateConfig::default()
        };
        let seen = in_pool(&pooled, || {
            (rayon::current_num_threads(), rayon::current_thread_index().is_some())
        })
        .unwrap();
        assert_eq!(seen, (2, true));
        assert!(in_pool(&GenerateConfig::default(), rayon::current_thread_index).unwrap().is_none());

        let free = free_below("2,1");
        let identities = ["xy - yx", "(xx)y - x(xy)"].map(|s| parse_identity(s).unwrap());
        let target = free.types.target_name();
        let cancel = CancelToken::new();
        let reference = generate_for_type(&identities, target, free.algebra(), &GenerateConfig::default(), &cancel);
        let outcome = generate_for_type(&identities, target, free.algebra(), &pooled, &cancel);
        assert!(matches!(outcome.status, Status::Complete));
        assert_eq!(outcome.equations, reference.equations);
        assert_eq!(outcome.stats, reference.stats);
    }
}
