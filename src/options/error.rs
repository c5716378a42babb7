use thiserror::Error;

use super::Stage;

/// Error type carried by fallible recipes.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OptionsError {
    /// A recipe failed while mutating the instance being resolved. The
    /// partially configured instance is discarded.
    #[error("{stage} recipe #{index} for `{type_name}` failed: {source}")]
    RecipeFailed {
        type_name: &'static str,
        stage: Stage,
        index: usize,
        source: BoxError,
    },
}
