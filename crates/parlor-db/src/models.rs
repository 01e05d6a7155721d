/// Database row types — these map directly to SQLite rows.
/// Distinct from the parlor-types API models to keep the DB layer
/// independent; timestamps stay as stored strings here.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct ChatRoomRow {
    pub id: i64,
    pub name: String,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: i64,
    pub chatroom: String,
    pub username: String,
    pub text: String,
    pub timestamp: String,
}

pub struct EmoticonRow {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub size: String,
    pub animated: bool,
    pub category: String,
    pub chatroom: String,
    pub timestamp: String,
}

/// A send joined with its catalog entry for name and url.
pub struct EmoticonSendRow {
    pub id: i64,
    pub chatroom: String,
    pub username: String,
    pub emoticon_id: i64,
    pub emoticon_name: String,
    pub url: String,
    pub timestamp: String,
}

#[derive(Debug)]
pub struct FileRow {
    pub id: i64,
    pub filename: String,
    pub url: String,
    pub version: i64,
    pub uploaded_at: String,
    pub chatroom: String,
}
