//! Room-data aggregation and the versioned-file model: membership-gated
//! write paths, an append-only version ledger per (chatroom, filename),
//! and a stable chronological merge of a room's entity streams.
//!
//! Every operation takes the store handle explicitly; there is no
//! process-wide database object.

pub mod emoticons;
pub mod error;
pub mod files;
pub mod identity;
pub mod messages;
pub mod rooms;
pub mod timeline;

pub use error::{CoreError, CoreResult};

#[cfg(test)]
pub(crate) mod testutil {
    use parlor_db::Database;

    pub fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    pub fn db_with_room(name: &str, members: &[&str]) -> Database {
        let db = db();
        let members: Vec<String> = members.iter().map(|m| m.to_string()).collect();
        crate::rooms::create_room(&db, name, &members).unwrap();
        db
    }
}
