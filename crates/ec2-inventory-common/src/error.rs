use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid tag filter {0:?}: expected KEY=VALUE")]
    InvalidTagFilter(String),
}
