use std::collections::HashMap;

use parlor_db::Database;
use parlor_db::models::FileRow;
use parlor_types::models::FileVersion;

use crate::error::{CoreError, CoreResult};
use crate::rooms;

/// Bounded retry for the read-max/insert race on the version ledger's
/// unique index. In-process writers are serialized by the connection
/// lock; this covers a second process on the same database file.
const BUMP_RETRIES: usize = 3;

/// First version of a (chatroom, filename), with the uploader as the
/// sole editor. No duplicate check is made; uploading the same filename
/// twice trips the ledger's unique index and reports VersionConflict.
pub fn upload_file(
    db: &Database,
    filename: &str,
    url: &str,
    uploader: &str,
    chatroom: &str,
) -> CoreResult<FileVersion> {
    rooms::require_room(db, chatroom)?;

    if filename.is_empty() {
        return Err(CoreError::InvalidInput("filename is required".into()));
    }

    let uploaded_at = parlor_db::now();
    let editors = vec![uploader.to_string()];
    match db.insert_file(filename, url, chatroom, &editors, &parlor_db::encode_timestamp(uploaded_at)) {
        Ok(row) => Ok(file_from_row(row, editors)),
        Err(e) if parlor_db::is_constraint_violation(&e) => Err(CoreError::VersionConflict {
            chatroom: chatroom.to_string(),
            filename: filename.to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Append the next version: max existing + 1, computed and inserted in
/// one transaction. `edited_by` is stored exactly as passed — the ledger
/// does not accumulate editor history across rows. Prior rows are never
/// touched.
pub fn bump_version(
    db: &Database,
    filename: &str,
    new_url: &str,
    editors: &[String],
    chatroom: &str,
) -> CoreResult<FileVersion> {
    let mut attempts = 0;
    loop {
        let uploaded_at = parlor_db::now();
        match db.bump_file_version(
            chatroom,
            filename,
            new_url,
            editors,
            &parlor_db::encode_timestamp(uploaded_at),
        ) {
            Ok(Some(row)) => return Ok(file_from_row(row, editors.to_vec())),
            Ok(None) => {
                return Err(CoreError::FileNotFound {
                    chatroom: chatroom.to_string(),
                    filename: filename.to_string(),
                });
            }
            Err(e) if parlor_db::is_constraint_violation(&e) => {
                // another writer claimed the version; re-read the max
                attempts += 1;
                if attempts >= BUMP_RETRIES {
                    return Err(CoreError::VersionConflict {
                        chatroom: chatroom.to_string(),
                        filename: filename.to_string(),
                    });
                }
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// The full ledger for one file, version ascending.
pub fn file_history(db: &Database, chatroom: &str, filename: &str) -> CoreResult<Vec<FileVersion>> {
    let rows = db.get_file_versions(chatroom, filename)?;
    if rows.is_empty() {
        return Err(CoreError::FileNotFound {
            chatroom: chatroom.to_string(),
            filename: filename.to_string(),
        });
    }

    let mut editor_map = editors_by_file(db, &rows)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let editors = editor_map.remove(&row.id).unwrap_or_default();
            file_from_row(row, editors)
        })
        .collect())
}

pub(crate) fn editors_by_file(
    db: &Database,
    rows: &[FileRow],
) -> CoreResult<HashMap<i64, Vec<String>>> {
    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut editor_map: HashMap<i64, Vec<String>> = HashMap::new();
    for (file_id, username) in db.get_editors_for_files(&ids)? {
        editor_map.entry(file_id).or_default().push(username);
    }
    Ok(editor_map)
}

pub(crate) fn file_from_row(row: FileRow, edited_by: Vec<String>) -> FileVersion {
    FileVersion {
        id: row.id,
        filename: row.filename,
        url: row.url,
        version: row.version,
        uploaded_at: parlor_db::decode_timestamp(&row.uploaded_at),
        chatroom: row.chatroom,
        edited_by,
    }
}
