use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("classroom.sqlite3");
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    // Key-value layout mirroring the dashboard's local storage.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

pub fn kv_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let v = conn
        .query_row("SELECT value FROM kv WHERE key = ?", [key], |r| {
            r.get::<_, String>(0)
        })
        .optional()?;
    Ok(v)
}

pub fn kv_put(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    // Upsert instead of INSERT OR REPLACE so an existing key keeps its rowid,
    // and with it its position in `kv_scan_prefix`.
    conn.execute(
        "INSERT INTO kv(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;
    Ok(())
}

pub fn kv_delete(conn: &Connection, key: &str) -> anyhow::Result<()> {
    conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
    Ok(())
}

/// (key, value) pairs whose key starts with `prefix`, in first-write order.
pub fn kv_scan_prefix(conn: &Connection, prefix: &str) -> anyhow::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM kv ORDER BY rowid")?;
    let rows = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows
        .into_iter()
        .filter(|(k, _)| k.starts_with(prefix))
        .collect())
}

pub fn kv_is_empty(conn: &Connection) -> anyhow::Result<bool> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM kv", [], |r| r.get(0))?;
    Ok(n == 0)
}

pub fn kv_clear(conn: &Connection) -> anyhow::Result<usize> {
    let n = conn.execute("DELETE FROM kv", [])?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem() -> Connection {
        let conn = Connection::open_in_memory().expect("open");
        init_schema(&conn).expect("schema");
        conn
    }

    #[test]
    fn upsert_keeps_scan_order() {
        let conn = mem();
        kv_put(&conn, "timetable_10A", "[1]").expect("put");
        kv_put(&conn, "settings", "{}").expect("put");
        kv_put(&conn, "timetable_10B", "[2]").expect("put");
        kv_put(&conn, "timetable_10A", "[3]").expect("put");

        let rows = kv_scan_prefix(&conn, "timetable_").expect("scan");
        assert_eq!(
            rows,
            vec![
                ("timetable_10A".to_string(), "[3]".to_string()),
                ("timetable_10B".to_string(), "[2]".to_string()),
            ]
        );
    }

    #[test]
    fn get_delete_clear() {
        let conn = mem();
        assert_eq!(kv_get(&conn, "settings").expect("get"), None);
        kv_put(&conn, "settings", "{\"a\":1}").expect("put");
        assert_eq!(
            kv_get(&conn, "settings").expect("get").as_deref(),
            Some("{\"a\":1}")
        );
        kv_delete(&conn, "settings").expect("delete");
        kv_delete(&conn, "settings").expect("delete missing");
        assert_eq!(kv_get(&conn, "settings").expect("get"), None);
        assert!(kv_is_empty(&conn).expect("count"));
        kv_put(&conn, "a", "1").expect("put");
        assert!(!kv_is_empty(&conn).expect("count"));
        kv_put(&conn, "b", "2").expect("put");
        assert_eq!(kv_clear(&conn).expect("clear"), 2);
    }
}
