use crate::Database;
use crate::models::{ChatRoomRow, EmoticonRow, EmoticonSendRow, FileRow, MessageRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, params};

impl Database {
    // -- Users --

    pub fn create_user(&self, username: &str, password_hash: &str, created_at: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (username, password, created_at) VALUES (?1, ?2, ?3)",
                (username, password_hash, created_at),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_username(conn, username))
    }

    // -- Chatrooms --

    /// Insert the room and its allow-list in one transaction. Duplicate
    /// names in `allowed_users` collapse into one membership row.
    pub fn create_chatroom(&self, name: &str, allowed_users: &[String], created_at: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO chatrooms (name, created_at) VALUES (?1, ?2)",
                (name, created_at),
            )?;
            let room_id = tx.last_insert_rowid();

            {
                let mut stmt = tx.prepare(
                    "INSERT OR IGNORE INTO chatroom_members (chatroom, username) VALUES (?1, ?2)",
                )?;
                for username in allowed_users {
                    stmt.execute((name, username))?;
                }
            }

            tx.commit()?;
            Ok(room_id)
        })
    }

    pub fn get_chatroom(&self, name: &str) -> Result<Option<ChatRoomRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, created_at FROM chatrooms WHERE name = ?1")?;

            let row = stmt
                .query_row([name], |row| {
                    Ok(ChatRoomRow {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                })
                .optional()?;

            Ok(row)
        })
    }

    pub fn get_members(&self, chatroom: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT username FROM chatroom_members WHERE chatroom = ?1 ORDER BY username",
            )?;
            let rows = stmt
                .query_map([chatroom], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(rows)
        })
    }

    pub fn is_member(&self, chatroom: &str, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM chatroom_members WHERE chatroom = ?1 AND username = ?2)",
                (chatroom, username),
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, chatroom: &str, username: &str, text: &str, timestamp: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (chatroom, username, text, timestamp) VALUES (?1, ?2, ?3, ?4)",
                (chatroom, username, text, timestamp),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_messages(&self, chatroom: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| query_messages(conn, chatroom))
    }

    /// Batch-fetch read receipts for a set of message IDs.
    pub fn get_reads_for_messages(&self, message_ids: &[i64]) -> Result<Vec<(i64, String)>> {
        if message_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=message_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT message_id, username FROM message_reads WHERE message_id IN ({}) ORDER BY message_id, username",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = message_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    // -- Emoticons --

    pub fn insert_emoticon(
        &self,
        name: &str,
        url: &str,
        size: &str,
        animated: bool,
        category: &str,
        chatroom: &str,
        timestamp: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO emoticons (name, url, size, animated, category, chatroom, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![name, url, size, animated, category, chatroom, timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_emoticon(&self, id: i64) -> Result<Option<EmoticonRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, url, size, animated, category, chatroom, timestamp
                 FROM emoticons WHERE id = ?1",
            )?;
            let row = stmt.query_row([id], map_emoticon_row).optional()?;
            Ok(row)
        })
    }

    /// Catalog listing in storage order, optionally filtered by category.
    pub fn get_emoticons(&self, category: Option<&str>) -> Result<Vec<EmoticonRow>> {
        self.with_conn(|conn| {
            let (sql, param): (&str, Vec<&dyn rusqlite::types::ToSql>) = match category {
                Some(ref cat) => (
                    "SELECT id, name, url, size, animated, category, chatroom, timestamp
                     FROM emoticons WHERE category = ?1 ORDER BY id",
                    vec![cat as &dyn rusqlite::types::ToSql],
                ),
                None => (
                    "SELECT id, name, url, size, animated, category, chatroom, timestamp
                     FROM emoticons ORDER BY id",
                    vec![],
                ),
            };
            let mut stmt = conn.prepare(sql)?;
            let rows = stmt
                .query_map(param.as_slice(), map_emoticon_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_emoticons_for_room(&self, chatroom: &str) -> Result<Vec<EmoticonRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, url, size, animated, category, chatroom, timestamp
                 FROM emoticons WHERE chatroom = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([chatroom], map_emoticon_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn insert_emoticon_send(
        &self,
        chatroom: &str,
        username: &str,
        emoticon_id: i64,
        timestamp: &str,
    ) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO emoticon_sends (chatroom, username, emoticon_id, timestamp)
                 VALUES (?1, ?2, ?3, ?4)",
                params![chatroom, username, emoticon_id, timestamp],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_emoticon_sends(&self, chatroom: &str) -> Result<Vec<EmoticonSendRow>> {
        self.with_conn(|conn| {
            // JOIN the catalog to carry name and url in a single query
            let mut stmt = conn.prepare(
                "SELECT s.id, s.chatroom, s.username, s.emoticon_id, e.name, e.url, s.timestamp
                 FROM emoticon_sends s
                 JOIN emoticons e ON s.emoticon_id = e.id
                 WHERE s.chatroom = ?1
                 ORDER BY s.id",
            )?;
            let rows = stmt
                .query_map([chatroom], |row| {
                    Ok(EmoticonSendRow {
                        id: row.get(0)?,
                        chatroom: row.get(1)?,
                        username: row.get(2)?,
                        emoticon_id: row.get(3)?,
                        emoticon_name: row.get(4)?,
                        url: row.get(5)?,
                        timestamp: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Files --

    /// First version of a fresh (chatroom, filename). No duplicate
    /// check here; the ledger's unique index rejects a second version 1.
    pub fn insert_file(
        &self,
        filename: &str,
        url: &str,
        chatroom: &str,
        editors: &[String],
        uploaded_at: &str,
    ) -> Result<FileRow> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO files (filename, url, version, uploaded_at, chatroom)
                 VALUES (?1, ?2, 1, ?3, ?4)",
                params![filename, url, uploaded_at, chatroom],
            )?;
            let id = tx.last_insert_rowid();
            insert_editors(&tx, id, editors)?;
            tx.commit()?;

            Ok(FileRow {
                id,
                filename: filename.to_string(),
                url: url.to_string(),
                version: 1,
                uploaded_at: uploaded_at.to_string(),
                chatroom: chatroom.to_string(),
            })
        })
    }

    /// Read-max plus insert in one transaction. Returns None when the
    /// (chatroom, filename) pair has no prior versions. A concurrent
    /// writer that claims the same version surfaces as a constraint
    /// violation for the caller to retry.
    pub fn bump_file_version(
        &self,
        chatroom: &str,
        filename: &str,
        url: &str,
        editors: &[String],
        uploaded_at: &str,
    ) -> Result<Option<FileRow>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let latest: Option<i64> = tx.query_row(
                "SELECT MAX(version) FROM files WHERE chatroom = ?1 AND filename = ?2",
                (chatroom, filename),
                |row| row.get(0),
            )?;
            let Some(latest) = latest else {
                return Ok(None);
            };

            let version = latest + 1;
            tx.execute(
                "INSERT INTO files (filename, url, version, uploaded_at, chatroom)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![filename, url, version, uploaded_at, chatroom],
            )?;
            let id = tx.last_insert_rowid();
            insert_editors(&tx, id, editors)?;
            tx.commit()?;

            Ok(Some(FileRow {
                id,
                filename: filename.to_string(),
                url: url.to_string(),
                version,
                uploaded_at: uploaded_at.to_string(),
                chatroom: chatroom.to_string(),
            }))
        })
    }

    pub fn get_file_versions(&self, chatroom: &str, filename: &str) -> Result<Vec<FileRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, filename, url, version, uploaded_at, chatroom
                 FROM files WHERE chatroom = ?1 AND filename = ?2
                 ORDER BY version",
            )?;
            let rows = stmt
                .query_map((chatroom, filename), map_file_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_files_for_room(&self, chatroom: &str) -> Result<Vec<FileRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, filename, url, version, uploaded_at, chatroom
                 FROM files WHERE chatroom = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([chatroom], map_file_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Batch-fetch editor lists for a set of file IDs, in caller-supplied
    /// order (seq ascending within each file).
    pub fn get_editors_for_files(&self, file_ids: &[i64]) -> Result<Vec<(i64, String)>> {
        if file_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=file_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT file_id, username FROM file_editors WHERE file_id IN ({}) ORDER BY file_id, seq",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> = file_ids
                .iter()
                .map(|id| id as &dyn rusqlite::types::ToSql)
                .collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>> {
    let mut stmt =
        conn.prepare("SELECT id, username, password, created_at FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_messages(conn: &Connection, chatroom: &str) -> Result<Vec<MessageRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, chatroom, username, text, timestamp
         FROM messages WHERE chatroom = ?1
         ORDER BY id",
    )?;

    let rows = stmt
        .query_map([chatroom], |row| {
            Ok(MessageRow {
                id: row.get(0)?,
                chatroom: row.get(1)?,
                username: row.get(2)?,
                text: row.get(3)?,
                timestamp: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_emoticon_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EmoticonRow> {
    Ok(EmoticonRow {
        id: row.get(0)?,
        name: row.get(1)?,
        url: row.get(2)?,
        size: row.get(3)?,
        animated: row.get(4)?,
        category: row.get(5)?,
        chatroom: row.get(6)?,
        timestamp: row.get(7)?,
    })
}

fn map_file_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<FileRow> {
    Ok(FileRow {
        id: row.get(0)?,
        filename: row.get(1)?,
        url: row.get(2)?,
        version: row.get(3)?,
        uploaded_at: row.get(4)?,
        chatroom: row.get(5)?,
    })
}

fn insert_editors(conn: &Connection, file_id: i64, editors: &[String]) -> Result<()> {
    let mut stmt =
        conn.prepare("INSERT INTO file_editors (file_id, seq, username) VALUES (?1, ?2, ?3)")?;
    for (seq, username) in editors.iter().enumerate() {
        stmt.execute(params![file_id, seq as i64, username])?;
    }
    Ok(())
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Database, is_constraint_violation};
    use anyhow::Result;

    const T0: &str = "2026-01-01T00:00:00.000000Z";

    fn db_with_room(name: &str, members: &[&str]) -> Database {
        let db = Database::open_in_memory().unwrap();
        let members: Vec<String> = members.iter().map(|m| m.to_string()).collect();
        db.create_chatroom(name, &members, T0).unwrap();
        db
    }

    #[test]
    fn test_chatroom_members() -> Result<()> {
        let db = db_with_room("lobby", &["alice", "bob", "alice"]);

        let room = db.get_chatroom("lobby")?.expect("room should exist");
        assert_eq!(room.name, "lobby");

        // duplicate member names collapse
        let members = db.get_members("lobby")?;
        assert_eq!(members, vec!["alice", "bob"]);

        assert!(db.is_member("lobby", "alice")?);
        assert!(!db.is_member("lobby", "carol")?);
        assert!(!db.is_member("no-such-room", "alice")?);
        Ok(())
    }

    #[test]
    fn test_duplicate_chatroom_is_constraint_violation() {
        let db = db_with_room("lobby", &[]);
        let err = db.create_chatroom("lobby", &[], T0).unwrap_err();
        assert!(is_constraint_violation(&err));
    }

    #[test]
    fn test_messages_in_insertion_order() -> Result<()> {
        let db = db_with_room("lobby", &["alice"]);

        // inserted out of chronological order on purpose
        db.insert_message("lobby", "alice", "second", "2026-01-02T00:00:00.000000Z")?;
        db.insert_message("lobby", "alice", "first", "2026-01-01T00:00:00.000000Z")?;

        let rows = db.get_messages("lobby")?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "second");
        assert_eq!(rows[1].text, "first");

        let reads = db.get_reads_for_messages(&[rows[0].id, rows[1].id])?;
        assert!(reads.is_empty());
        Ok(())
    }

    #[test]
    fn test_emoticon_category_filter() -> Result<()> {
        let db = db_with_room("lobby", &[]);
        db.insert_emoticon("wave", "http://e/wave.gif", "small", true, "greetings", "lobby", T0)?;
        db.insert_emoticon("fire", "http://e/fire.png", "large", false, "misc", "lobby", T0)?;

        assert_eq!(db.get_emoticons(None)?.len(), 2);
        let greetings = db.get_emoticons(Some("greetings"))?;
        assert_eq!(greetings.len(), 1);
        assert_eq!(greetings[0].name, "wave");
        assert!(greetings[0].animated);
        Ok(())
    }

    #[test]
    fn test_emoticon_send_joins_catalog() -> Result<()> {
        let db = db_with_room("lobby", &["alice"]);
        let eid = db.insert_emoticon("wave", "http://e/wave.gif", "small", true, "greetings", "lobby", T0)?;
        db.insert_emoticon_send("lobby", "alice", eid, T0)?;

        let sends = db.get_emoticon_sends("lobby")?;
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].emoticon_name, "wave");
        assert_eq!(sends[0].url, "http://e/wave.gif");
        assert_eq!(sends[0].username, "alice");
        Ok(())
    }

    #[test]
    fn test_file_ledger_appends() -> Result<()> {
        let db = db_with_room("lobby", &[]);

        let v1 = db.insert_file("a.png", "http://x", "lobby", &["alice".into()], T0)?;
        assert_eq!(v1.version, 1);

        let v2 = db
            .bump_file_version("lobby", "a.png", "http://y", &["bob".into(), "alice".into()], T0)?
            .expect("prior version exists");
        assert_eq!(v2.version, 2);

        let versions = db.get_file_versions("lobby", "a.png")?;
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].url, "http://x");
        assert_eq!(versions[1].url, "http://y");

        // editor order preserved per row
        let editors = db.get_editors_for_files(&[v2.id])?;
        let names: Vec<&str> = editors.iter().map(|(_, u)| u.as_str()).collect();
        assert_eq!(names, vec!["bob", "alice"]);
        Ok(())
    }

    #[test]
    fn test_bump_missing_file_returns_none() -> Result<()> {
        let db = db_with_room("lobby", &[]);
        let bumped = db.bump_file_version("lobby", "ghost.txt", "http://y", &[], T0)?;
        assert!(bumped.is_none());
        Ok(())
    }

    #[test]
    fn test_duplicate_version_rejected_by_unique_index() {
        let db = db_with_room("lobby", &[]);
        db.insert_file("a.png", "http://x", "lobby", &[], T0).unwrap();

        let err = db.insert_file("a.png", "http://x2", "lobby", &[], T0).unwrap_err();
        assert!(is_constraint_violation(&err));
    }
}
