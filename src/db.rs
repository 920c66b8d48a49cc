use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::{Attendance, EntryStatus, JournalEntry, Mood, RoleFields, User, UserProfile};

/// Shared handle to the single store connection. Handlers hold the lock
/// only for the duration of their synchronous store calls.
pub type Db = Arc<Mutex<Connection>>;

pub fn conn(db: &Db) -> MutexGuard<'_, Connection> {
    // A poisoned lock still wraps a usable connection.
    db.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn open_db(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;

    // Role-specific fields live in nullable columns; the role tag decides
    // which ones a row is expected to carry.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT NOT NULL,
            avatar TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL,
            password TEXT NOT NULL,
            nisn TEXT,
            class TEXT,
            teacher_id TEXT,
            parent_id TEXT,
            nip TEXT,
            subject TEXT,
            nik TEXT,
            child_id TEXT
        )",
        [],
    )?;
    // Natural-key login lookups.
    conn.execute("CREATE INDEX IF NOT EXISTS idx_users_nisn ON users(nisn)", [])?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_users_nip ON users(nip)", [])?;
    conn.execute("CREATE INDEX IF NOT EXISTS idx_users_nik ON users(nik)", [])?;

    // Deliberately no foreign key on student_id: deleting a user must not
    // cascade, orphaned entries stay retrievable.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS journals(
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            date TEXT NOT NULL,
            submission_time TEXT NOT NULL,
            category TEXT NOT NULL,
            activity TEXT NOT NULL,
            attendance TEXT NOT NULL,
            behavior_note TEXT NOT NULL DEFAULT '',
            mood TEXT NOT NULL,
            reflection TEXT NOT NULL DEFAULT '',
            teacher_comment TEXT,
            status TEXT NOT NULL
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_journals_student ON journals(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_journals_date ON journals(date, submission_time)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row("SELECT value_json FROM app_settings WHERE key = ?", [key], |r| {
            r.get(0)
        })
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn settings_set_json(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO app_settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}

/// SELECT list matching [`user_from_row`]'s column order.
pub const USER_COLUMNS: &str =
    "id, name, role, avatar, email, password, nisn, class, teacher_id, parent_id, nip, subject, nik, child_id";

pub fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    let role: String = row.get(2)?;
    let opt = |idx: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
    };
    let role = match role.as_str() {
        "Siswa" => RoleFields::Student {
            nisn: opt(6)?,
            class: opt(7)?,
            teacher_id: opt(8)?,
            parent_id: opt(9)?,
        },
        "Guru" => RoleFields::Teacher {
            nip: opt(10)?,
            class: opt(7)?,
            subject: opt(11)?,
        },
        "Orang Tua" => RoleFields::Parent {
            nik: opt(12)?,
            child_id: opt(13)?,
        },
        "Admin" => RoleFields::Admin { nip: opt(10)? },
        other => {
            return Err(rusqlite::Error::FromSqlConversionFailure(
                2,
                rusqlite::types::Type::Text,
                format!("unknown role: {other}").into(),
            ))
        }
    };
    Ok(User {
        id: row.get(0)?,
        profile: UserProfile {
            name: row.get(1)?,
            avatar: row.get(3)?,
            email: row.get(4)?,
            password: Some(row.get(5)?),
            role,
        },
    })
}

/// Full-row write. Used for both create and replace-style update; the
/// caller decides whether the id may already exist.
pub fn upsert_user(conn: &Connection, user: &User) -> rusqlite::Result<()> {
    let p = &user.profile;
    let (nisn, class, teacher_id, parent_id, nip, subject, nik, child_id) = match &p.role {
        RoleFields::Student {
            nisn,
            class,
            teacher_id,
            parent_id,
        } => (
            Some(nisn.as_str()),
            Some(class.as_str()),
            Some(teacher_id.as_str()),
            Some(parent_id.as_str()),
            None,
            None,
            None,
            None,
        ),
        RoleFields::Teacher { nip, class, subject } => (
            None,
            Some(class.as_str()),
            None,
            None,
            Some(nip.as_str()),
            Some(subject.as_str()),
            None,
            None,
        ),
        RoleFields::Parent { nik, child_id } => (
            None,
            None,
            None,
            None,
            None,
            None,
            Some(nik.as_str()),
            Some(child_id.as_str()),
        ),
        RoleFields::Admin { nip } => {
            (None, None, None, None, Some(nip.as_str()), None, None, None)
        }
    };
    conn.execute(
        "INSERT INTO users(id, name, role, avatar, email, password,
                           nisn, class, teacher_id, parent_id, nip, subject, nik, child_id)
         VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           role = excluded.role,
           avatar = excluded.avatar,
           email = excluded.email,
           password = excluded.password,
           nisn = excluded.nisn,
           class = excluded.class,
           teacher_id = excluded.teacher_id,
           parent_id = excluded.parent_id,
           nip = excluded.nip,
           subject = excluded.subject,
           nik = excluded.nik,
           child_id = excluded.child_id",
        rusqlite::params![
            user.id,
            p.name,
            p.role.role_name(),
            p.avatar,
            p.email,
            p.password.as_deref().unwrap_or_default(),
            nisn,
            class,
            teacher_id,
            parent_id,
            nip,
            subject,
            nik,
            child_id,
        ],
    )?;
    Ok(())
}

/// SELECT list matching [`journal_from_row`]'s column order.
pub const JOURNAL_COLUMNS: &str =
    "id, student_id, date, submission_time, category, activity, attendance, behavior_note, mood, reflection, teacher_comment, status";

pub fn journal_from_row(row: &Row) -> rusqlite::Result<JournalEntry> {
    let text_enum = |idx: usize, what: &str, raw: &str| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown {what}: {raw}").into(),
        )
    };
    let attendance_raw: String = row.get(6)?;
    let attendance = Attendance::parse(&attendance_raw)
        .ok_or_else(|| text_enum(6, "attendance", &attendance_raw))?;
    let mood_raw: String = row.get(8)?;
    let mood = Mood::parse(&mood_raw).ok_or_else(|| text_enum(8, "mood", &mood_raw))?;
    let status_raw: String = row.get(11)?;
    let status =
        EntryStatus::parse(&status_raw).ok_or_else(|| text_enum(11, "status", &status_raw))?;
    Ok(JournalEntry {
        id: row.get(0)?,
        student_id: row.get(1)?,
        date: row.get(2)?,
        submission_time: row.get(3)?,
        category: row.get(4)?,
        activity: row.get(5)?,
        attendance,
        behavior_note: row.get(7)?,
        mood,
        reflection: row.get(9)?,
        teacher_comment: row.get(10)?,
        status,
    })
}

pub fn upsert_journal(conn: &Connection, entry: &JournalEntry) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO journals(id, student_id, date, submission_time, category, activity,
                              attendance, behavior_note, mood, reflection, teacher_comment, status)
         VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
         ON CONFLICT(id) DO UPDATE SET
           student_id = excluded.student_id,
           date = excluded.date,
           submission_time = excluded.submission_time,
           category = excluded.category,
           activity = excluded.activity,
           attendance = excluded.attendance,
           behavior_note = excluded.behavior_note,
           mood = excluded.mood,
           reflection = excluded.reflection,
           teacher_comment = excluded.teacher_comment,
           status = excluded.status",
        rusqlite::params![
            entry.id,
            entry.student_id,
            entry.date,
            entry.submission_time,
            entry.category,
            entry.activity,
            entry.attendance.as_str(),
            entry.behavior_note,
            entry.mood.as_str(),
            entry.reflection,
            entry.teacher_comment,
            entry.status.as_str(),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoleFields;

    fn mem_db() -> Connection {
        // rusqlite treats ":memory:" specially, so open_db's real schema
        // applies without touching the filesystem.
        open_db(Path::new(":memory:")).expect("open in-memory db")
    }

    #[test]
    fn user_round_trips_through_role_columns() {
        let conn = mem_db();
        let user = User {
            id: "teacher-7".into(),
            profile: UserProfile {
                name: "Ibu Guru".into(),
                avatar: "".into(),
                email: "guru@sekolah.id".into(),
                password: Some("password123".into()),
                role: RoleFields::Teacher {
                    nip: "19850101".into(),
                    class: "Kelas 5A".into(),
                    subject: "Matematika".into(),
                },
            },
        };
        upsert_user(&conn, &user).expect("insert");

        let got = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                ["teacher-7"],
                user_from_row,
            )
            .expect("select");
        assert_eq!(got.profile.name, "Ibu Guru");
        match got.profile.role {
            RoleFields::Teacher { ref nip, ref subject, .. } => {
                assert_eq!(nip, "19850101");
                assert_eq!(subject, "Matematika");
            }
            ref other => panic!("expected teacher, got {:?}", other),
        }
    }

    #[test]
    fn upsert_user_replaces_all_fields() {
        let conn = mem_db();
        let mut user = User {
            id: "admin-1".into(),
            profile: UserProfile {
                name: "Admin".into(),
                avatar: "".into(),
                email: "admin@sekolah.id".into(),
                password: Some("pw".into()),
                role: RoleFields::Admin { nip: "ADMIN001".into() },
            },
        };
        upsert_user(&conn, &user).expect("insert");
        user.profile.name = "Admin Baru".into();
        user.profile.role = RoleFields::Admin { nip: "ADMIN009".into() };
        upsert_user(&conn, &user).expect("replace");

        let got = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                ["admin-1"],
                user_from_row,
            )
            .expect("select");
        assert_eq!(got.profile.name, "Admin Baru");
        match got.profile.role {
            RoleFields::Admin { ref nip } => assert_eq!(nip, "ADMIN009"),
            ref other => panic!("expected admin, got {:?}", other),
        }
    }

    #[test]
    fn settings_json_round_trip() {
        let conn = mem_db();
        assert!(settings_get_json(&conn, "app.settings").expect("get").is_none());
        let v = serde_json::json!({ "theme": "dark" });
        settings_set_json(&conn, "app.settings", &v).expect("set");
        assert_eq!(settings_get_json(&conn, "app.settings").expect("get"), Some(v));
    }
}
