use common::*;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unknown definition name {0:?}")]
    MissingDefinition(String),

    #[error("unknown definition id {0:?}")]
    MissingDefinitionId(u32),

    #[error("definition {0:?} registered twice")]
    DuplicateDefinition(String),
}
