/// Errors surfaced by the entry points in [`crate::api`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid parameter. {0}")]
    InvalidParameter(String),
    /// Wraps any failure raised while walking the box tree.
    #[error("Invalid ISO file. {0}")]
    InvalidIsoFile(String),
}
