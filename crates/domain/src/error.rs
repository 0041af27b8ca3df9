#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}

impl ReadError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReadError::Storage(StorageError::Timeout))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("no connection")]
    NoConnection,
    #[error("no session")]
    NoSession,
    #[error("request timed out")]
    Timeout,
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error>),
}
