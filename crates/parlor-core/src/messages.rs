use std::collections::HashMap;

use parlor_db::Database;
use parlor_db::models::MessageRow;
use parlor_types::models::Message;

use crate::error::{CoreError, CoreResult};
use crate::rooms;

/// Append a message to the room. The caller must be on the allow-list;
/// timestamp is assigned here, id by the store.
pub fn post_message(db: &Database, chatroom: &str, username: &str, text: &str) -> CoreResult<Message> {
    rooms::require_member(db, chatroom, username)?;

    if text.is_empty() {
        return Err(CoreError::InvalidInput("message text is required".into()));
    }

    let timestamp = parlor_db::now();
    let id = db.insert_message(chatroom, username, text, &parlor_db::encode_timestamp(timestamp))?;

    Ok(Message {
        id,
        chatroom: chatroom.to_string(),
        username: username.to_string(),
        text: text.to_string(),
        timestamp,
        read_by: vec![],
    })
}

/// Room history in insertion order. Reads are gated on room existence;
/// `require_membership` additionally restricts them to the allow-list
/// (the write paths always gate on membership, reads only when asked —
/// see PARLOR_STRICT_READS).
pub fn get_messages(
    db: &Database,
    chatroom: &str,
    caller: &str,
    require_membership: bool,
) -> CoreResult<Vec<Message>> {
    rooms::require_room(db, chatroom)?;
    if require_membership && !db.is_member(chatroom, caller)? {
        return Err(CoreError::NotAllowed {
            user: caller.to_string(),
            room: chatroom.to_string(),
        });
    }

    let rows = db.get_messages(chatroom)?;
    let mut read_map = reads_by_message(db, &rows)?;

    Ok(rows
        .into_iter()
        .map(|row| message_from_row(row, &mut read_map))
        .collect())
}

pub(crate) fn reads_by_message(
    db: &Database,
    rows: &[MessageRow],
) -> CoreResult<HashMap<i64, Vec<String>>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut read_map: HashMap<i64, Vec<String>> = HashMap::new();
    for (message_id, username) in db.get_reads_for_messages(&ids)? {
        read_map.entry(message_id).or_default().push(username);
    }
    Ok(read_map)
}

pub(crate) fn message_from_row(row: MessageRow, read_map: &mut HashMap<i64, Vec<String>>) -> Message {
    Message {
        id: row.id,
        chatroom: row.chatroom,
        username: row.username,
        text: row.text,
        timestamp: parlor_db::decode_timestamp(&row.timestamp),
        read_by: read_map.remove(&row.id).unwrap_or_default(),
    }
}
