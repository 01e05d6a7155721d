use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Non-secret view of a registered user. The password hash never leaves
/// the database layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A chatroom and its allow-list. The allow-list is fixed at creation;
/// there is no add/remove-member operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: i64,
    pub name: String,
    pub allowed_users: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub chatroom: String,
    pub username: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub read_by: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmoticonSize {
    Small,
    Medium,
    Large,
}

impl EmoticonSize {
    pub fn as_str(self) -> &'static str {
        match self {
            EmoticonSize::Small => "small",
            EmoticonSize::Medium => "medium",
            EmoticonSize::Large => "large",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "small" => Some(EmoticonSize::Small),
            "medium" => Some(EmoticonSize::Medium),
            "large" => Some(EmoticonSize::Large),
            _ => None,
        }
    }
}

/// A catalog entry. Catalog entries are stored per chatroom and show up
/// in that room's merged timeline at their creation instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emoticon {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub size: EmoticonSize,
    pub animated: bool,
    pub category: String,
    pub chatroom: String,
    pub timestamp: DateTime<Utc>,
}

/// An emoticon posted into a room, carrying a reference to the catalog
/// entry it was sent from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmoticonSend {
    pub id: i64,
    pub chatroom: String,
    pub username: String,
    pub emoticon_id: i64,
    pub emoticon_name: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

/// One row of a file's version ledger. Rows are append-only: an upload
/// creates version 1, every bump adds a new row, nothing is ever edited
/// or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileVersion {
    pub id: i64,
    pub filename: String,
    pub url: String,
    pub version: i64,
    pub uploaded_at: DateTime<Utc>,
    pub chatroom: String,
    pub edited_by: Vec<String>,
}

/// One element of a room's merged chronological view. The `kind` tag
/// discriminates the variant in JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEntry {
    Message(Message),
    EmoticonSend(EmoticonSend),
    Emoticon(Emoticon),
    FileVersion(FileVersion),
}

impl TimelineEntry {
    /// The entry's own chronological field (`uploaded_at` for files,
    /// `timestamp` for everything else).
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            TimelineEntry::Message(m) => m.timestamp,
            TimelineEntry::EmoticonSend(s) => s.timestamp,
            TimelineEntry::Emoticon(e) => e.timestamp,
            TimelineEntry::FileVersion(f) => f.uploaded_at,
        }
    }
}
