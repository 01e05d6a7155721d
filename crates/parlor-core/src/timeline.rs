use parlor_db::Database;
use parlor_types::models::TimelineEntry;

use crate::error::{CoreError, CoreResult};
use crate::{emoticons, files, messages, rooms};

/// One chronological view over everything stored against a room:
/// messages, emoticon sends, emoticon catalog entries, and every file
/// version. Streams are concatenated in that fixed order and then
/// stable-sorted by each entry's own instant, so entries with equal
/// instants keep the fetch order.
///
/// Reads are gated on room existence; `require_membership` additionally
/// restricts them to the allow-list, same as `get_messages`.
pub fn get_room_data(
    db: &Database,
    chatroom: &str,
    caller: &str,
    require_membership: bool,
) -> CoreResult<Vec<TimelineEntry>> {
    rooms::require_room(db, chatroom)?;
    if require_membership && !db.is_member(chatroom, caller)? {
        return Err(CoreError::NotAllowed {
            user: caller.to_string(),
            room: chatroom.to_string(),
        });
    }

    let message_rows = db.get_messages(chatroom)?;
    let send_rows = db.get_emoticon_sends(chatroom)?;
    let emoticon_rows = db.get_emoticons_for_room(chatroom)?;
    let file_rows = db.get_files_for_room(chatroom)?;

    let mut read_map = messages::reads_by_message(db, &message_rows)?;
    let mut editor_map = files::editors_by_file(db, &file_rows)?;

    let mut entries: Vec<TimelineEntry> = Vec::with_capacity(
        message_rows.len() + send_rows.len() + emoticon_rows.len() + file_rows.len(),
    );

    entries.extend(
        message_rows
            .into_iter()
            .map(|row| TimelineEntry::Message(messages::message_from_row(row, &mut read_map))),
    );
    entries.extend(
        send_rows
            .into_iter()
            .map(|row| TimelineEntry::EmoticonSend(emoticons::send_from_row(row))),
    );
    entries.extend(
        emoticon_rows
            .into_iter()
            .map(|row| TimelineEntry::Emoticon(emoticons::emoticon_from_row(row))),
    );
    entries.extend(file_rows.into_iter().map(|row| {
        let editors = editor_map.remove(&row.id).unwrap_or_default();
        TimelineEntry::FileVersion(files::file_from_row(row, editors))
    }));

    // sort_by_key is stable; ties keep the concatenation order above
    entries.sort_by_key(|entry| entry.instant());

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    const T1: &str = "2026-01-01T10:00:00.000000Z";
    const T2: &str = "2026-01-01T11:00:00.000000Z";
    const T3: &str = "2026-01-01T12:00:00.000000Z";

    #[test]
    fn entries_merge_in_chronological_order() {
        let db = testutil::db_with_room("general", &["alice"]);

        // messages at T1 and T3, a file version between them at T2
        db.insert_message("general", "alice", "first", T1).unwrap();
        db.insert_message("general", "alice", "third", T3).unwrap();
        db.insert_file("notes.txt", "http://x", "general", &["alice".into()], T2)
            .unwrap();

        let timeline = get_room_data(&db, "general", "alice", false).unwrap();
        assert_eq!(timeline.len(), 3);

        assert!(matches!(&timeline[0], TimelineEntry::Message(m) if m.text == "first"));
        assert!(matches!(&timeline[1], TimelineEntry::FileVersion(f) if f.filename == "notes.txt"));
        assert!(matches!(&timeline[2], TimelineEntry::Message(m) if m.text == "third"));
    }

    #[test]
    fn all_four_streams_are_merged() {
        let db = testutil::db_with_room("general", &["alice"]);

        db.insert_message("general", "alice", "hello", T1).unwrap();
        let eid = db
            .insert_emoticon("wave", "http://e/wave.gif", "small", true, "greetings", "general", T2)
            .unwrap();
        db.insert_emoticon_send("general", "alice", eid, T3).unwrap();
        db.insert_file("a.png", "http://x", "general", &[], T2).unwrap();

        let timeline = get_room_data(&db, "general", "alice", false).unwrap();
        assert_eq!(timeline.len(), 4);
        assert!(timeline.iter().any(|e| matches!(e, TimelineEntry::Message(_))));
        assert!(timeline.iter().any(|e| matches!(e, TimelineEntry::Emoticon(_))));
        assert!(timeline.iter().any(|e| matches!(e, TimelineEntry::EmoticonSend(_))));
        assert!(timeline.iter().any(|e| matches!(e, TimelineEntry::FileVersion(_))));

        // sorted by instant
        for pair in timeline.windows(2) {
            assert!(pair[0].instant() <= pair[1].instant());
        }
    }

    #[test]
    fn equal_instants_keep_fetch_order() {
        let db = testutil::db_with_room("general", &["alice"]);

        // file inserted first, message second, both at the same instant;
        // the merge still lists the message first
        db.insert_file("a.png", "http://x", "general", &[], T1).unwrap();
        db.insert_message("general", "alice", "same instant", T1).unwrap();

        let timeline = get_room_data(&db, "general", "alice", false).unwrap();
        assert!(matches!(&timeline[0], TimelineEntry::Message(_)));
        assert!(matches!(&timeline[1], TimelineEntry::FileVersion(_)));
    }

    #[test]
    fn missing_room_and_strict_reads() {
        let db = testutil::db_with_room("general", &["alice"]);

        assert!(matches!(
            get_room_data(&db, "nowhere", "alice", false).unwrap_err(),
            CoreError::RoomNotFound(_)
        ));

        // default policy: any caller may read an existing room
        assert!(get_room_data(&db, "general", "carol", false).is_ok());

        // strict policy: allow-list enforced
        assert!(matches!(
            get_room_data(&db, "general", "carol", true).unwrap_err(),
            CoreError::NotAllowed { .. }
        ));
        assert!(get_room_data(&db, "general", "alice", true).is_ok());
    }

    #[test]
    fn every_file_version_appears() {
        let db = testutil::db_with_room("general", &["alice"]);

        db.insert_file("a.png", "http://v1", "general", &[], T1).unwrap();
        db.bump_file_version("general", "a.png", "http://v2", &[], T2).unwrap();
        db.bump_file_version("general", "a.png", "http://v3", &[], T3).unwrap();

        let timeline = get_room_data(&db, "general", "alice", false).unwrap();
        let versions: Vec<i64> = timeline
            .iter()
            .filter_map(|e| match e {
                TimelineEntry::FileVersion(f) => Some(f.version),
                _ => None,
            })
            .collect();
        assert_eq!(versions, vec![1, 2, 3]);
    }
}
