use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use crate::db;
use crate::error::StoreError;
use crate::model::{now_iso, AttendanceRecord, Class, School, Student};

/// The one local persistence handle, shared by the attendance recorder and
/// the sync engine. The connection sits behind an async mutex so concurrent
/// callers serialize at the store boundary; at most one mutating batch runs
/// at a time.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Workspace-backed store (the normal case).
    pub fn open(workspace: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::open_db(workspace)?),
        })
    }

    /// In-memory store for hosts without a writable data directory.
    pub fn in_memory() -> anyhow::Result<Self> {
        Ok(Self {
            conn: Mutex::new(db::open_memory_db()?),
        })
    }

    // ----- schools -----

    pub async fn schools(&self) -> Result<Vec<School>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, address, synced, created_at, updated_at, last_sync
             FROM schools ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], school_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub async fn school(&self, id: i64) -> Result<Option<School>, StoreError> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT id, name, address, synced, created_at, updated_at, last_sync
                 FROM schools WHERE id = ?",
                [id],
                school_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub async fn save_school(&self, school: &School) -> Result<i64, StoreError> {
        let conn = self.conn.lock().await;
        save_school_on(&conn, school)
    }

    pub async fn save_schools(&self, schools: &[School]) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let tx = conn.unchecked_transaction()?;
        for school in schools {
            save_school_on(&tx, school)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Classes keep their rows with `school_id = NULL` via the FK action;
    /// only the school itself goes away.
    pub async fn delete_school(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM schools WHERE id = ?", [id])?;
        Ok(())
    }

    pub async fn mark_schools_synced(&self, last_sync: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE schools SET synced = 1, last_sync = ?",
            [last_sync],
        )?;
        Ok(())
    }

    // ----- classes -----

    pub async fn classes(&self, school_id: Option<i64>) -> Result<Vec<Class>, StoreError> {
        let conn = self.conn.lock().await;
        let sql = "SELECT id, name, school_id, synced, created_at, updated_at, last_sync
                   FROM classes";
        let rows = match school_id {
            Some(sid) => {
                let mut stmt = conn.prepare(&format!("{} WHERE school_id = ? ORDER BY id", sql))?;
                let rows = stmt
                    .query_map([sid], class_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!("{} ORDER BY id", sql))?;
                let rows = stmt
                    .query_map([], class_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };
        Ok(rows)
    }

    pub async fn class(&self, id: i64) -> Result<Option<Class>, StoreError> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT id, name, school_id, synced, created_at, updated_at, last_sync
                 FROM classes WHERE id = ?",
                [id],
                class_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub async fn save_class(&self, class: &Class) -> Result<i64, StoreError> {
        let conn = self.conn.lock().await;
        save_class_on(&conn, class)
    }

    pub async fn save_classes(&self, classes: &[Class]) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let tx = conn.unchecked_transaction()?;
        for class in classes {
            save_class_on(&tx, class)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub async fn delete_class(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM classes WHERE id = ?", [id])?;
        Ok(())
    }

    pub async fn mark_classes_synced(&self, last_sync: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE classes SET synced = 1, last_sync = ?",
            [last_sync],
        )?;
        Ok(())
    }

    // ----- students -----

    /// Students are returned with their attendance projection hydrated from
    /// the attendance table (the table stays the source of truth; the list is
    /// a read-only cache for the UI).
    pub async fn students(&self, class_id: Option<i64>) -> Result<Vec<Student>, StoreError> {
        let conn = self.conn.lock().await;
        let sql = "SELECT id, name, class_id, synced, created_at, updated_at, last_sync
                   FROM students";
        let mut students = match class_id {
            Some(cid) => {
                let mut stmt = conn.prepare(&format!("{} WHERE class_id = ? ORDER BY id", sql))?;
                let rows = stmt
                    .query_map([cid], student_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = conn.prepare(&format!("{} ORDER BY id", sql))?;
                let rows = stmt
                    .query_map([], student_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        let mut by_student: HashMap<i64, Vec<AttendanceRecord>> = HashMap::new();
        let mut stmt = conn.prepare(
            "SELECT id, student_id, date, present, observation, synced, created_at, updated_at, last_sync
             FROM attendance ORDER BY date",
        )?;
        let records = stmt
            .query_map([], attendance_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for rec in records {
            by_student.entry(rec.student_id).or_default().push(rec);
        }
        for student in &mut students {
            if let Some(id) = student.id {
                student.attendance = by_student.remove(&id).unwrap_or_default();
            }
        }
        Ok(students)
    }

    pub async fn student(&self, id: i64) -> Result<Option<Student>, StoreError> {
        let conn = self.conn.lock().await;
        let row = conn
            .query_row(
                "SELECT id, name, class_id, synced, created_at, updated_at, last_sync
                 FROM students WHERE id = ?",
                [id],
                student_from_row,
            )
            .optional()?;
        Ok(row)
    }

    pub async fn save_student(&self, student: &Student) -> Result<i64, StoreError> {
        let conn = self.conn.lock().await;
        save_student_on(&conn, student)
    }

    pub async fn save_students(&self, students: &[Student]) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let tx = conn.unchecked_transaction()?;
        for student in students {
            save_student_on(&tx, student)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Attendance history goes with the student (FK cascade).
    pub async fn delete_student(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM students WHERE id = ?", [id])?;
        Ok(())
    }

    pub async fn mark_students_synced(&self, last_sync: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE students SET synced = 1, last_sync = ?",
            [last_sync],
        )?;
        Ok(())
    }

    // ----- attendance -----

    pub async fn attendance(
        &self,
        student_id: Option<i64>,
        date: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let conn = self.conn.lock().await;
        let mut sql = String::from(
            "SELECT id, student_id, date, present, observation, synced, created_at, updated_at, last_sync
             FROM attendance WHERE 1=1",
        );
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(sid) = student_id {
            sql.push_str(" AND student_id = ?");
            args.push(Box::new(sid));
        }
        if let Some(day) = date {
            sql.push_str(" AND date = ?");
            args.push(Box::new(day.to_string()));
        }
        sql.push_str(" ORDER BY date, student_id");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(args.iter().map(|a| a.as_ref())),
                attendance_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub async fn attendance_by_key(
        &self,
        student_id: i64,
        date: &str,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let conn = self.conn.lock().await;
        attendance_by_key_on(&conn, student_id, date)
    }

    /// Upsert keyed by `(student_id, date)`: an existing row for the key is
    /// updated in place, keeping its id; a row carrying an id (server copy)
    /// replaces whatever conflicts with it.
    pub async fn save_attendance(&self, rec: &AttendanceRecord) -> Result<i64, StoreError> {
        let conn = self.conn.lock().await;
        save_attendance_on(&conn, rec)
    }

    pub async fn save_attendance_bulk(
        &self,
        records: &[AttendanceRecord],
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let tx = conn.unchecked_transaction()?;
        for rec in records {
            save_attendance_on(&tx, rec)?;
        }
        tx.commit()?;
        Ok(())
    }

    pub async fn delete_attendance(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM attendance WHERE id = ?", [id])?;
        Ok(())
    }

    /// Rows still waiting for a successful push.
    pub async fn pending_attendance(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, student_id, date, present, observation, synced, created_at, updated_at, last_sync
             FROM attendance WHERE synced = 0 ORDER BY date, student_id",
        )?;
        let rows = stmt
            .query_map([], attendance_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub async fn pending_attendance_count(&self) -> Result<i64, StoreError> {
        let conn = self.conn.lock().await;
        let count =
            conn.query_row("SELECT COUNT(*) FROM attendance WHERE synced = 0", [], |r| {
                r.get(0)
            })?;
        Ok(count)
    }

    /// Flip a record to synced after a confirmed single-record push, adopting
    /// the server-echoed id when the server assigned one.
    pub async fn mark_attendance_synced(
        &self,
        student_id: i64,
        date: &str,
        server_id: Option<i64>,
        last_sync: &str,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "UPDATE attendance SET id = COALESCE(?, id), synced = 1, last_sync = ?
             WHERE student_id = ? AND date = ?",
            params![server_id, last_sync, student_id, date],
        )?;
        Ok(())
    }

    pub async fn mark_attendance_ids_synced(
        &self,
        ids: &[i64],
        last_sync: &str,
    ) -> Result<(), StoreError> {
        let conn = self.conn.lock().await;
        let tx = conn.unchecked_transaction()?;
        for id in ids {
            tx.execute(
                "UPDATE attendance SET synced = 1, last_sync = ? WHERE id = ?",
                params![last_sync, id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn school_from_row(r: &rusqlite::Row) -> rusqlite::Result<School> {
    Ok(School {
        id: Some(r.get(0)?),
        name: r.get(1)?,
        address: r.get(2)?,
        synced: r.get::<_, i64>(3)? != 0,
        created_at: r.get(4)?,
        updated_at: r.get(5)?,
        last_sync: r.get(6)?,
    })
}

fn class_from_row(r: &rusqlite::Row) -> rusqlite::Result<Class> {
    Ok(Class {
        id: Some(r.get(0)?),
        name: r.get(1)?,
        school_id: r.get(2)?,
        synced: r.get::<_, i64>(3)? != 0,
        created_at: r.get(4)?,
        updated_at: r.get(5)?,
        last_sync: r.get(6)?,
    })
}

fn student_from_row(r: &rusqlite::Row) -> rusqlite::Result<Student> {
    Ok(Student {
        id: Some(r.get(0)?),
        name: r.get(1)?,
        class_id: r.get(2)?,
        attendance: Vec::new(),
        synced: r.get::<_, i64>(3)? != 0,
        created_at: r.get(4)?,
        updated_at: r.get(5)?,
        last_sync: r.get(6)?,
    })
}

fn attendance_from_row(r: &rusqlite::Row) -> rusqlite::Result<AttendanceRecord> {
    Ok(AttendanceRecord {
        id: Some(r.get(0)?),
        student_id: r.get(1)?,
        date: r.get(2)?,
        present: r.get::<_, i64>(3)? != 0,
        observation: r.get(4)?,
        synced: r.get::<_, i64>(5)? != 0,
        created_at: r.get(6)?,
        updated_at: r.get(7)?,
        last_sync: r.get(8)?,
    })
}

// updated_at must never move backwards for a given id, even when a stale
// server copy is written over a fresher local row.
fn bump_updated_at(existing: Option<String>, incoming: Option<&str>, now: &str) -> String {
    let incoming = incoming.unwrap_or(now);
    match existing {
        Some(prev) if prev.as_str() > incoming => prev,
        _ => incoming.to_string(),
    }
}

fn existing_updated_at(
    conn: &Connection,
    table: &str,
    id: i64,
) -> Result<Option<String>, StoreError> {
    let found = conn
        .query_row(
            &format!("SELECT updated_at FROM {} WHERE id = ?", table),
            [id],
            |r| r.get::<_, Option<String>>(0),
        )
        .optional()?;
    Ok(found.flatten())
}

fn save_school_on(conn: &Connection, s: &School) -> Result<i64, StoreError> {
    let now = now_iso();
    match s.id {
        Some(id) => {
            let updated_at = bump_updated_at(
                existing_updated_at(conn, "schools", id)?,
                s.updated_at.as_deref(),
                &now,
            );
            // True upsert, not REPLACE: with foreign keys on, REPLACE's
            // implicit delete would fire ON DELETE SET NULL on child classes.
            conn.execute(
                "INSERT INTO schools(id, name, address, synced, created_at, updated_at, last_sync)
                 VALUES(?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    address = excluded.address,
                    synced = excluded.synced,
                    updated_at = excluded.updated_at,
                    last_sync = excluded.last_sync",
                params![
                    id,
                    s.name,
                    s.address,
                    s.synced,
                    s.created_at.as_deref().unwrap_or(&now),
                    updated_at,
                    s.last_sync
                ],
            )?;
            Ok(id)
        }
        None => {
            conn.execute(
                "INSERT INTO schools(name, address, synced, created_at, updated_at, last_sync)
                 VALUES(?, ?, ?, ?, ?, ?)",
                params![
                    s.name,
                    s.address,
                    s.synced,
                    s.created_at.as_deref().unwrap_or(&now),
                    s.updated_at.as_deref().unwrap_or(&now),
                    s.last_sync
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }
}

fn save_class_on(conn: &Connection, c: &Class) -> Result<i64, StoreError> {
    let now = now_iso();
    match c.id {
        Some(id) => {
            let updated_at = bump_updated_at(
                existing_updated_at(conn, "classes", id)?,
                c.updated_at.as_deref(),
                &now,
            );
            // Upsert for the same reason as schools: REPLACE would orphan the
            // class's students through the FK action.
            conn.execute(
                "INSERT INTO classes(id, name, school_id, synced, created_at, updated_at, last_sync)
                 VALUES(?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    school_id = excluded.school_id,
                    synced = excluded.synced,
                    updated_at = excluded.updated_at,
                    last_sync = excluded.last_sync",
                params![
                    id,
                    c.name,
                    c.school_id,
                    c.synced,
                    c.created_at.as_deref().unwrap_or(&now),
                    updated_at,
                    c.last_sync
                ],
            )?;
            Ok(id)
        }
        None => {
            conn.execute(
                "INSERT INTO classes(name, school_id, synced, created_at, updated_at, last_sync)
                 VALUES(?, ?, ?, ?, ?, ?)",
                params![
                    c.name,
                    c.school_id,
                    c.synced,
                    c.created_at.as_deref().unwrap_or(&now),
                    c.updated_at.as_deref().unwrap_or(&now),
                    c.last_sync
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }
}

fn save_student_on(conn: &Connection, s: &Student) -> Result<i64, StoreError> {
    let now = now_iso();
    match s.id {
        Some(id) => {
            let updated_at = bump_updated_at(
                existing_updated_at(conn, "students", id)?,
                s.updated_at.as_deref(),
                &now,
            );
            // Upsert: a REPLACE here would cascade-delete the student's
            // attendance rows, pending ones included.
            conn.execute(
                "INSERT INTO students(id, name, class_id, synced, created_at, updated_at, last_sync)
                 VALUES(?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    class_id = excluded.class_id,
                    synced = excluded.synced,
                    updated_at = excluded.updated_at,
                    last_sync = excluded.last_sync",
                params![
                    id,
                    s.name,
                    s.class_id,
                    s.synced,
                    s.created_at.as_deref().unwrap_or(&now),
                    updated_at,
                    s.last_sync
                ],
            )?;
            Ok(id)
        }
        None => {
            conn.execute(
                "INSERT INTO students(name, class_id, synced, created_at, updated_at, last_sync)
                 VALUES(?, ?, ?, ?, ?, ?)",
                params![
                    s.name,
                    s.class_id,
                    s.synced,
                    s.created_at.as_deref().unwrap_or(&now),
                    s.updated_at.as_deref().unwrap_or(&now),
                    s.last_sync
                ],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }
}

fn attendance_by_key_on(
    conn: &Connection,
    student_id: i64,
    date: &str,
) -> Result<Option<AttendanceRecord>, StoreError> {
    let row = conn
        .query_row(
            "SELECT id, student_id, date, present, observation, synced, created_at, updated_at, last_sync
             FROM attendance WHERE student_id = ? AND date = ?",
            params![student_id, date],
            attendance_from_row,
        )
        .optional()?;
    Ok(row)
}

fn save_attendance_on(conn: &Connection, rec: &AttendanceRecord) -> Result<i64, StoreError> {
    let now = now_iso();
    if let Some(id) = rec.id {
        // Server copy: REPLACE resolves both the id conflict and a
        // (student, date) collision with a local pending row, which is the
        // last-pull-wins policy. Attendance has no child tables, so the
        // implicit delete fires no FK actions.
        let updated_at = bump_updated_at(
            existing_updated_at(conn, "attendance", id)?,
            rec.updated_at.as_deref(),
            &now,
        );
        conn.execute(
            "INSERT OR REPLACE INTO attendance(id, student_id, date, present, observation, synced, created_at, updated_at, last_sync)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                rec.student_id,
                rec.date,
                rec.present,
                rec.observation,
                rec.synced,
                rec.created_at.as_deref().unwrap_or(&now),
                updated_at,
                rec.last_sync
            ],
        )?;
        return Ok(id);
    }

    // Find-or-create by the composite key; never blind-insert a duplicate.
    if let Some(existing) = attendance_by_key_on(conn, rec.student_id, &rec.date)? {
        let id = existing.id.unwrap_or_default();
        let updated_at = bump_updated_at(existing.updated_at, rec.updated_at.as_deref(), &now);
        conn.execute(
            "UPDATE attendance SET present = ?, observation = ?, synced = ?, updated_at = ?
             WHERE id = ?",
            params![rec.present, rec.observation, rec.synced, updated_at, id],
        )?;
        Ok(id)
    } else {
        conn.execute(
            "INSERT INTO attendance(student_id, date, present, observation, synced, created_at, updated_at, last_sync)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                rec.student_id,
                rec.date,
                rec.present,
                rec.observation,
                rec.synced,
                rec.created_at.as_deref().unwrap_or(&now),
                rec.updated_at.as_deref().unwrap_or(&now),
                rec.last_sync
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn school(name: &str) -> School {
        School {
            id: None,
            name: name.to_string(),
            address: "Rua 1".to_string(),
            synced: false,
            created_at: None,
            updated_at: None,
            last_sync: None,
        }
    }

    fn record(student_id: i64, date: &str, present: bool) -> AttendanceRecord {
        AttendanceRecord {
            id: None,
            student_id,
            date: date.to_string(),
            present,
            observation: None,
            synced: false,
            created_at: None,
            updated_at: None,
            last_sync: None,
        }
    }

    async fn seeded_student(store: &Store) -> i64 {
        store
            .save_student(&Student {
                id: None,
                name: "Ana".to_string(),
                class_id: None,
                attendance: Vec::new(),
                synced: false,
                created_at: None,
                updated_at: None,
                last_sync: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn upsert_by_key_keeps_one_row_and_its_id() {
        let store = Store::in_memory().unwrap();
        let sid = seeded_student(&store).await;

        let first = store.save_attendance(&record(sid, "2026-03-02", true)).await.unwrap();
        let second = store.save_attendance(&record(sid, "2026-03-02", false)).await.unwrap();
        assert_eq!(first, second);

        let rows = store.attendance(Some(sid), None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].present);
    }

    #[tokio::test]
    async fn bulk_save_is_atomic() {
        let store = Store::in_memory().unwrap();
        let sid = seeded_student(&store).await;

        // Second row violates the student FK, so the whole batch must roll back.
        let batch = vec![record(sid, "2026-03-02", true), record(9999, "2026-03-02", true)];
        assert!(store.save_attendance_bulk(&batch).await.is_err());
        assert_eq!(store.attendance(None, None).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn save_with_id_preserves_server_identity() {
        let store = Store::in_memory().unwrap();
        let mut s = school("Escola A");
        s.id = Some(41);
        let id = store.save_school(&s).await.unwrap();
        assert_eq!(id, 41);
        assert_eq!(store.school(41).await.unwrap().unwrap().name, "Escola A");
    }

    #[tokio::test]
    async fn resaving_a_student_keeps_their_attendance() {
        let store = Store::in_memory().unwrap();
        let sid = seeded_student(&store).await;
        store.save_attendance(&record(sid, "2026-03-02", true)).await.unwrap();

        // Server copy of the same student arriving through a pull.
        let mut server_copy = store.student(sid).await.unwrap().unwrap();
        server_copy.synced = true;
        store.save_students(&[server_copy]).await.unwrap();

        let rows = store.attendance(Some(sid), None).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].synced);
    }

    #[tokio::test]
    async fn resaving_a_school_keeps_class_links() {
        let store = Store::in_memory().unwrap();
        let mut s = school("Escola A");
        s.id = Some(1);
        store.save_school(&s).await.unwrap();
        let class_id = store
            .save_class(&Class {
                id: None,
                name: "Turma 1".to_string(),
                school_id: Some(1),
                synced: false,
                created_at: None,
                updated_at: None,
                last_sync: None,
            })
            .await
            .unwrap();

        s.synced = true;
        store.save_schools(&[s]).await.unwrap();

        let class = store.class(class_id).await.unwrap().unwrap();
        assert_eq!(class.school_id, Some(1));
    }

    #[tokio::test]
    async fn updated_at_never_goes_backwards() {
        let store = Store::in_memory().unwrap();
        let mut s = school("Escola A");
        s.id = Some(1);
        s.updated_at = Some("2026-05-01T10:00:00.000Z".to_string());
        store.save_school(&s).await.unwrap();

        // Stale server copy with an older timestamp.
        s.updated_at = Some("2026-04-01T10:00:00.000Z".to_string());
        store.save_school(&s).await.unwrap();

        let row = store.school(1).await.unwrap().unwrap();
        assert_eq!(row.updated_at.as_deref(), Some("2026-05-01T10:00:00.000Z"));
    }
}
