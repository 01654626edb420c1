use crate::{algebra::AlgebraError, ids::TypeName, types::TypeError};

/// Failure of an equation generation run. Running out of branches is not an
/// error, the run simply produces nothing.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generation was cancelled")]
    Cancelled,
    #[error("out of memory while growing the {0}")]
    ResourceExhausted(&'static str),
    #[error("target {0} is not in the type table")]
    UnknownTarget(TypeName),
    #[error(transparent)]
    Algebra(#[from] AlgebraError),
    #[error(transparent)]
    Type(#[from] TypeError),
    #[error("cannot build evaluation thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
