use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Every fallible operation returns one of these kinds; failures are
/// values, never panics. `RoomNotFound` and `NotAllowed` stay distinct
/// so a missing room is never reported as a membership failure.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    #[error("chatroom already exists: {0}")]
    DuplicateRoom(String),

    #[error("chatroom not found: {0}")]
    RoomNotFound(String),

    #[error("user {user} is not allowed in chatroom {room}")]
    NotAllowed { user: String, room: String },

    #[error("no uploaded versions of {filename} in chatroom {chatroom}")]
    FileNotFound { chatroom: String, filename: String },

    #[error("emoticon not found: {0}")]
    EmoticonNotFound(i64),

    #[error("version conflict for {filename} in chatroom {chatroom}")]
    VersionConflict { chatroom: String, filename: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}
