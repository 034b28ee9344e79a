use rusqlite::Connection;
use std::path::Path;

/// Open (or create) the workspace database and bring its schema up to date.
pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("rollbook.sqlite3");
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// In-memory variant for hosts without a writable workspace directory.
/// Same engine, same schema; the choice is made once at startup.
pub fn open_memory_db() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    // Cascade and orphaning policy lives in the schema, not in business code:
    // deleting a school sets its classes' school_id to NULL, deleting a
    // student removes its attendance rows.
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS schools(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            address TEXT NOT NULL,
            synced INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            last_sync TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS classes(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            school_id INTEGER,
            synced INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            last_sync TEXT,
            FOREIGN KEY(school_id) REFERENCES schools(id) ON DELETE SET NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_classes_school ON classes(school_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            class_id INTEGER,
            synced INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            last_sync TEXT,
            FOREIGN KEY(class_id) REFERENCES classes(id) ON DELETE SET NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_class ON students(class_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS attendance(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            present INTEGER NOT NULL,
            observation TEXT,
            synced INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            last_sync TEXT,
            FOREIGN KEY(student_id) REFERENCES students(id) ON DELETE CASCADE,
            UNIQUE(student_id, date)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_student ON attendance(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(date)",
        [],
    )?;

    // Workspaces created before per-record reconciliation tracking may lack
    // the last_sync column. Add it where needed.
    for table in ["schools", "classes", "students", "attendance"] {
        ensure_last_sync_column(conn, table)?;
    }

    Ok(())
}

fn ensure_last_sync_column(conn: &Connection, table: &str) -> anyhow::Result<()> {
    if table_has_column(conn, table, "last_sync")? {
        return Ok(());
    }
    conn.execute(
        &format!("ALTER TABLE {} ADD COLUMN last_sync TEXT", table),
        [],
    )?;
    Ok(())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> anyhow::Result<bool> {
    let sql = format!("PRAGMA table_info({})", table);
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        if name == column {
            return Ok(true);
        }
    }
    Ok(false)
}
