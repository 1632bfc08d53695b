use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("registry returned no authorization data")]
    MissingAuthData,

    #[error("authorization token is not valid base64: {0}")]
    TokenDecode(#[from] base64::DecodeError),

    #[error("authorization token is not valid UTF-8: {0}")]
    TokenUtf8(#[from] std::string::FromUtf8Error),

    #[error("authorization token has no `user:password` separator")]
    TokenFormat,

    #[error("registry rejected the delete: {0}")]
    DeleteRejected(String),

    #[error("`{command}` failed with {status}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
    },
}
