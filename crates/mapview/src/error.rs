#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("{0} backend is not available on this target")]
    Unsupported(&'static str),
    #[error("map backend failed to start: {0}")]
    BackendInit(String),
    /// An operation that needs an initialized surface reached one that is not.
    #[error("map backend is not initialized")]
    NotInitialized,
    #[error("no pin with id `{0}`")]
    UnknownPin(String),
}
