use parlor_db::Database;
use parlor_db::models::{EmoticonRow, EmoticonSendRow};
use parlor_types::models::{Emoticon, EmoticonSend, EmoticonSize};
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::rooms;

/// Unconditional catalog append. There is no duplicate check; adding the
/// same name twice yields two catalog entries (accepted gap).
pub fn add_emoticon(
    db: &Database,
    name: &str,
    url: &str,
    size: EmoticonSize,
    animated: bool,
    category: &str,
    chatroom: &str,
) -> CoreResult<Emoticon> {
    rooms::require_room(db, chatroom)?;

    let timestamp = parlor_db::now();
    let id = db.insert_emoticon(
        name,
        url,
        size.as_str(),
        animated,
        category,
        chatroom,
        &parlor_db::encode_timestamp(timestamp),
    )?;

    Ok(Emoticon {
        id,
        name: name.to_string(),
        url: url.to_string(),
        size,
        animated,
        category: category.to_string(),
        chatroom: chatroom.to_string(),
        timestamp,
    })
}

/// Catalog in storage order, filtered by category when one is given.
pub fn list_emoticons(db: &Database, category: Option<&str>) -> CoreResult<Vec<Emoticon>> {
    let rows = db.get_emoticons(category)?;
    Ok(rows.into_iter().map(emoticon_from_row).collect())
}

/// Post an emoticon into a room's timeline. Checks run in order: the
/// room must exist, the id must resolve against the catalog, and the
/// sender must be on the allow-list.
pub fn send_emoticon(
    db: &Database,
    chatroom: &str,
    username: &str,
    emoticon_id: i64,
) -> CoreResult<EmoticonSend> {
    rooms::require_room(db, chatroom)?;

    let emoticon = db
        .get_emoticon(emoticon_id)?
        .ok_or(CoreError::EmoticonNotFound(emoticon_id))?;

    if !db.is_member(chatroom, username)? {
        return Err(CoreError::NotAllowed {
            user: username.to_string(),
            room: chatroom.to_string(),
        });
    }

    let timestamp = parlor_db::now();
    let id = db.insert_emoticon_send(
        chatroom,
        username,
        emoticon_id,
        &parlor_db::encode_timestamp(timestamp),
    )?;

    Ok(EmoticonSend {
        id,
        chatroom: chatroom.to_string(),
        username: username.to_string(),
        emoticon_id,
        emoticon_name: emoticon.name,
        url: emoticon.url,
        timestamp,
    })
}

pub(crate) fn emoticon_from_row(row: EmoticonRow) -> Emoticon {
    let size = EmoticonSize::parse(&row.size).unwrap_or_else(|| {
        warn!("Corrupt size '{}' on emoticon {}", row.size, row.id);
        EmoticonSize::Small
    });

    Emoticon {
        id: row.id,
        name: row.name,
        url: row.url,
        size,
        animated: row.animated,
        category: row.category,
        chatroom: row.chatroom,
        timestamp: parlor_db::decode_timestamp(&row.timestamp),
    }
}

pub(crate) fn send_from_row(row: EmoticonSendRow) -> EmoticonSend {
    EmoticonSend {
        id: row.id,
        chatroom: row.chatroom,
        username: row.username,
        emoticon_id: row.emoticon_id,
        emoticon_name: row.emoticon_name,
        url: row.url,
        timestamp: parlor_db::decode_timestamp(&row.timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn catalog_append_and_category_filter() {
        let db = testutil::db_with_room("general", &["alice"]);

        add_emoticon(&db, "wave", "http://e/wave.gif", EmoticonSize::Small, true, "greetings", "general").unwrap();
        add_emoticon(&db, "fire", "http://e/fire.png", EmoticonSize::Large, false, "misc", "general").unwrap();
        // no duplicate check: same name appends again
        add_emoticon(&db, "wave", "http://e/wave2.gif", EmoticonSize::Medium, true, "greetings", "general").unwrap();

        assert_eq!(list_emoticons(&db, None).unwrap().len(), 3);

        let greetings = list_emoticons(&db, Some("greetings")).unwrap();
        assert_eq!(greetings.len(), 2);
        assert!(greetings.iter().all(|e| e.category == "greetings"));
    }

    #[test]
    fn send_references_the_catalog_entry() {
        let db = testutil::db_with_room("general", &["alice"]);
        let emoticon =
            add_emoticon(&db, "wave", "http://e/wave.gif", EmoticonSize::Small, true, "greetings", "general").unwrap();

        let send = send_emoticon(&db, "general", "alice", emoticon.id).unwrap();
        assert_eq!(send.emoticon_id, emoticon.id);
        assert_eq!(send.emoticon_name, "wave");
        assert_eq!(send.url, "http://e/wave.gif");
        assert_eq!(send.username, "alice");
    }

    #[test]
    fn send_error_precedence() {
        let db = testutil::db_with_room("general", &["alice"]);
        let emoticon =
            add_emoticon(&db, "wave", "http://e/wave.gif", EmoticonSize::Small, true, "greetings", "general").unwrap();

        // missing room wins over everything
        assert!(matches!(
            send_emoticon(&db, "nowhere", "alice", emoticon.id).unwrap_err(),
            CoreError::RoomNotFound(_)
        ));
        // unknown id beats membership
        assert!(matches!(
            send_emoticon(&db, "general", "carol", 9999).unwrap_err(),
            CoreError::EmoticonNotFound(9999)
        ));
        // known id, non-member
        assert!(matches!(
            send_emoticon(&db, "general", "carol", emoticon.id).unwrap_err(),
            CoreError::NotAllowed { .. }
        ));
    }
}
