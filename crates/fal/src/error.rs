/// Failure of a remote image-edit call.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection, DNS, TLS or non-2xx status failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The body could not be parsed as a JSON object.
    #[error("invalid response format: {0}")]
    InvalidResponseFormat(String),

    /// The provider answered with a structured `error` field.
    #[error("remote error: {0}")]
    Remote(String),

    /// The body parsed but lacked a usable result image URL.
    #[error("unexpected response shape: {0}")]
    UnexpectedResponseShape(String),

    /// The provider's content-safety checker flagged the output.
    #[error("rejected by content safety checker")]
    SafetyRejected,

    /// The local image payload could not be turned into a request.
    #[error("invalid image payload: {0}")]
    Payload(String),

    /// Every attempt failed with a retryable error.
    #[error("gave up after {attempts} attempts: {last}")]
    ExhaustedRetries { attempts: u32, last: Box<EditError> },
}

impl EditError {
    /// Whether another attempt of the same call may succeed.
    ///
    /// Safety rejections and local payload errors would fail identically on
    /// every attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            EditError::Timeout
            | EditError::Transport(_)
            | EditError::InvalidResponseFormat(_)
            | EditError::Remote(_)
            | EditError::UnexpectedResponseShape(_) => true,
            EditError::SafetyRejected
            | EditError::Payload(_)
            | EditError::ExhaustedRetries { .. } => false,
        }
    }
}

impl From<reqwest::Error> for EditError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EditError::Timeout
        } else {
            EditError::Transport(err.to_string())
        }
    }
}
