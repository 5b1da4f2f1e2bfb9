use thiserror::Error;

/// Message shown when decoding a selected file fails. Corrupt files are
/// indistinguishable from unsupported ones as far as the user is concerned.
pub const INVALID_FILE_MESSAGE: &str = "Invalid or corrupt image file";

/// Message shown when a non-image file is dropped on an image-only surface.
pub const DROP_IMAGE_MESSAGE: &str = "Please drop an image file";

/// Everything that can go wrong between selecting a file and receiving the
/// uploaded asset. Each variant maps to exactly one point of detection in the
/// pipeline; none of them are retried automatically.
#[derive(Error, Debug)]
pub enum UploadError {
    /// The file failed a configured rule (MIME type, byte size).
    #[error("{0}")]
    Validation(String),

    /// The file could not be decoded as an image.
    #[error("{0}")]
    Decode(String),

    /// The transport collaborator reported a failure. The message is passed
    /// through verbatim.
    #[error("{0}")]
    Transport(String),

    /// A non-image file was dropped where an image was required.
    #[error("{0}")]
    DragRejected(String),

    /// The upload policy could not be parsed.
    #[error("Invalid upload policy: {0}")]
    Policy(#[from] serde_json::Error),

    /// An operation was invoked in a session state that does not permit it.
    #[error("Operation not permitted in state {from}: {event}")]
    State { from: String, event: String },
}

impl UploadError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// The string installed in the session's error state and handed to the
    /// `on_error` hook.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

pub type Result<T> = std::result::Result<T, UploadError>;
