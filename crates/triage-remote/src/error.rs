#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("remote api error (status {code}): {message}")]
    Api { code: u16, message: String },
    #[error("not found: {id}")]
    NotFound { id: String },
    #[error("unauthorized: remote rejected the credentials")]
    Unauthorized,
    #[error("transport failure: {message}")]
    Transport { message: String },
}
