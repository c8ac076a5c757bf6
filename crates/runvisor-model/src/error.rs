use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid process spec: {0}")]
    InvalidSpec(String),

    #[error("invalid timeout policy: {0}")]
    InvalidTimeout(String),
}
