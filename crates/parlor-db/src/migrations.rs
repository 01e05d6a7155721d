use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chatrooms (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL
        );

        -- Allow-list as real rows, fixed after room creation.
        CREATE TABLE IF NOT EXISTS chatroom_members (
            chatroom    TEXT NOT NULL REFERENCES chatrooms(name),
            username    TEXT NOT NULL,
            PRIMARY KEY (chatroom, username)
        );

        CREATE TABLE IF NOT EXISTS messages (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            chatroom    TEXT NOT NULL REFERENCES chatrooms(name),
            username    TEXT NOT NULL,
            text        TEXT NOT NULL,
            timestamp   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_chatroom
            ON messages(chatroom, timestamp);

        CREATE TABLE IF NOT EXISTS message_reads (
            message_id  INTEGER NOT NULL REFERENCES messages(id),
            username    TEXT NOT NULL,
            PRIMARY KEY (message_id, username)
        );

        CREATE TABLE IF NOT EXISTS emoticons (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL,
            url         TEXT NOT NULL,
            size        TEXT NOT NULL CHECK (size IN ('small', 'medium', 'large')),
            animated    INTEGER NOT NULL,
            category    TEXT NOT NULL,
            chatroom    TEXT NOT NULL REFERENCES chatrooms(name),
            timestamp   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_emoticons_category
            ON emoticons(category);

        CREATE TABLE IF NOT EXISTS emoticon_sends (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            chatroom    TEXT NOT NULL REFERENCES chatrooms(name),
            username    TEXT NOT NULL,
            emoticon_id INTEGER NOT NULL REFERENCES emoticons(id),
            timestamp   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_emoticon_sends_chatroom
            ON emoticon_sends(chatroom, timestamp);

        -- Append-only version ledger. The unique index backstops
        -- concurrent bumps of the same (chatroom, filename).
        CREATE TABLE IF NOT EXISTS files (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            filename    TEXT NOT NULL,
            url         TEXT NOT NULL,
            version     INTEGER NOT NULL,
            uploaded_at TEXT NOT NULL,
            chatroom    TEXT NOT NULL REFERENCES chatrooms(name),
            UNIQUE (chatroom, filename, version)
        );

        -- edited_by as an ordered relation; seq preserves the order the
        -- caller supplied.
        CREATE TABLE IF NOT EXISTS file_editors (
            file_id     INTEGER NOT NULL REFERENCES files(id),
            seq         INTEGER NOT NULL,
            username    TEXT NOT NULL,
            PRIMARY KEY (file_id, seq)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
