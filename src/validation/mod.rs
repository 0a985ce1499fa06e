use crate::core::ValidationError;

/// Business-rule check run on the destination after every field and
/// post-mapping callback was applied.
pub trait PatchValidator<D>: Send + Sync {
    fn validate(&self, destination: &D) -> Result<(), ValidationError>;
}

impl<D, F> PatchValidator<D> for F
where
    F: Fn(&D) -> Result<(), ValidationError> + Send + Sync,
{
    fn validate(&self, destination: &D) -> Result<(), ValidationError> {
        self(destination)
    }
}
