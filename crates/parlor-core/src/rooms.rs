use parlor_db::Database;
use parlor_types::models::ChatRoom;

use crate::error::{CoreError, CoreResult};

/// Create a room with its allow-list. Room names are unique; the
/// allow-list is fixed from here on.
pub fn create_room(db: &Database, name: &str, allowed_users: &[String]) -> CoreResult<ChatRoom> {
    if name.is_empty() {
        return Err(CoreError::InvalidInput("room name is required".into()));
    }

    if db.get_chatroom(name)?.is_some() {
        return Err(CoreError::DuplicateRoom(name.to_string()));
    }

    let created_at = parlor_db::now();
    let id = db.create_chatroom(name, allowed_users, &parlor_db::encode_timestamp(created_at))?;
    let allowed_users = db.get_members(name)?;

    Ok(ChatRoom {
        id,
        name: name.to_string(),
        allowed_users,
        created_at,
    })
}

pub fn get_room(db: &Database, name: &str) -> CoreResult<ChatRoom> {
    let row = db
        .get_chatroom(name)?
        .ok_or_else(|| CoreError::RoomNotFound(name.to_string()))?;
    let allowed_users = db.get_members(name)?;

    Ok(ChatRoom {
        id: row.id,
        name: row.name,
        allowed_users,
        created_at: parlor_db::decode_timestamp(&row.created_at),
    })
}

/// False when the room does not exist.
pub fn is_member(db: &Database, name: &str, username: &str) -> CoreResult<bool> {
    Ok(db.is_member(name, username)?)
}

/// Shared write-path gate: a missing room is reported as RoomNotFound,
/// a non-member as NotAllowed, in that order.
pub(crate) fn require_member(db: &Database, room: &str, username: &str) -> CoreResult<()> {
    require_room(db, room)?;
    if !db.is_member(room, username)? {
        return Err(CoreError::NotAllowed {
            user: username.to_string(),
            room: room.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn require_room(db: &Database, room: &str) -> CoreResult<()> {
    if db.get_chatroom(room)?.is_none() {
        return Err(CoreError::RoomNotFound(room.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn create_and_get_room() {
        let db = testutil::db();

        let room = create_room(&db, "general", &["alice".into(), "bob".into()]).unwrap();
        assert_eq!(room.name, "general");
        assert_eq!(room.allowed_users, vec!["alice", "bob"]);

        let fetched = get_room(&db, "general").unwrap();
        assert_eq!(fetched.id, room.id);
        assert_eq!(fetched.allowed_users, room.allowed_users);
    }

    #[test]
    fn duplicate_room_rejected() {
        let db = testutil::db_with_room("general", &["alice"]);

        let err = create_room(&db, "general", &[]).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateRoom(ref n) if n == "general"));
    }

    #[test]
    fn missing_room_is_not_found() {
        let db = testutil::db();
        assert!(matches!(
            get_room(&db, "nowhere").unwrap_err(),
            CoreError::RoomNotFound(_)
        ));
    }

    #[test]
    fn membership_is_false_for_missing_room() {
        let db = testutil::db_with_room("general", &["alice"]);

        assert!(is_member(&db, "general", "alice").unwrap());
        assert!(!is_member(&db, "general", "carol").unwrap());
        assert!(!is_member(&db, "nowhere", "alice").unwrap());
    }
}
