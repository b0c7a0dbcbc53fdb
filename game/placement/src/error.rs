use common::*;

#[derive(Debug, Error)]
pub enum PlacementError {
    /// The dependency graph contains a cycle; placement is disabled until
    /// definitions are fixed and the executor is reinitialized.
    #[error("cyclic dependency: {0}")]
    CyclicDependency(String),

    #[error("referenced definition {0:?} not found in catalog")]
    MissingDefinition(String),
}
