use rusqlite::Connection;
use uuid::Uuid;

use crate::db;
use crate::models::{
    Attendance, EntryStatus, JournalEntry, Mood, RoleFields, User, UserProfile,
};
use crate::settings;

fn user(id: &str, name: &str, email: &str, avatar_tag: &str, role: RoleFields) -> User {
    User {
        id: id.to_string(),
        profile: UserProfile {
            name: name.to_string(),
            avatar: format!("https://i.pravatar.cc/150?u={avatar_tag}"),
            email: email.to_string(),
            password: Some("password123".to_string()),
            role,
        },
    }
}

/// The fixed built-in account list: four students of Kelas 5A, their
/// teacher plus one more, one parent each, and two admins.
pub fn seed_users() -> Vec<User> {
    let student = |n: u32, name: &str, email: &str, nisn: &str| {
        user(
            &format!("student-{n}"),
            name,
            email,
            &format!("student{n}"),
            RoleFields::Student {
                nisn: nisn.to_string(),
                class: "Kelas 5A".to_string(),
                teacher_id: "teacher-1".to_string(),
                parent_id: format!("parent-{n}"),
            },
        )
    };
    let parent = |n: u32, name: &str, email: &str, nik: &str| {
        user(
            &format!("parent-{n}"),
            name,
            email,
            &format!("parent{n}"),
            RoleFields::Parent {
                nik: nik.to_string(),
                child_id: format!("student-{n}"),
            },
        )
    };
    vec![
        student(1, "Budi Santoso", "budi@sekolah.id", "001"),
        student(2, "Citra Lestari", "citra@sekolah.id", "002"),
        student(3, "Andi Pratama", "andi@sekolah.id", "003"),
        student(4, "Eka Yuliana", "eka@sekolah.id", "004"),
        user(
            "teacher-1",
            "Ibu Guru Anisa",
            "anisa@sekolah.id",
            "teacher1",
            RoleFields::Teacher {
                nip: "198501012010012001".to_string(),
                class: "Kelas 5A".to_string(),
                subject: "Guru Kelas".to_string(),
            },
        ),
        user(
            "teacher-2",
            "Bapak Guru Budi",
            "gurubudi@sekolah.id",
            "teacher2",
            RoleFields::Teacher {
                nip: "198602022011021002".to_string(),
                class: "Kelas 5B".to_string(),
                subject: "Matematika".to_string(),
            },
        ),
        parent(1, "Ayah Budi", "ayahbudi@email.com", "3301011010800001"),
        parent(2, "Ibu Citra", "ibucitra@email.com", "3301015010820002"),
        parent(3, "Bapak Andi", "bapakandi@email.com", "3301011010850003"),
        parent(4, "Ibu Eka", "ibueka@email.com", "3301015010900004"),
        user(
            "admin-1",
            "Admin Sekolah",
            "admin@sekolah.id",
            "admin1",
            RoleFields::Admin { nip: "ADMIN001".to_string() },
        ),
        user(
            "admin-2",
            "Kepala Sekolah",
            "kepsek@sekolah.id",
            "admin2",
            RoleFields::Admin { nip: "ADMIN002".to_string() },
        ),
    ]
}

/// The fixed starter entries. Ids are assigned at insert time.
pub fn seed_journal_entries() -> Vec<JournalEntry> {
    vec![
        JournalEntry {
            id: Uuid::new_v4().to_string(),
            student_id: "student-1".to_string(),
            date: "2024-07-28".to_string(),
            submission_time: "08:15:30".to_string(),
            category: "Kegiatan Pembelajaran".to_string(),
            activity: "Belajar Matematika tentang pecahan.".to_string(),
            attendance: Attendance::Present,
            behavior_note: String::new(),
            mood: Mood::Neutral,
            reflection: "Agak sulit memahami, tapi aku akan terus mencoba.".to_string(),
            teacher_comment: Some(
                "Bagus Budi, jangan menyerah! Coba kerjakan latihan tambahan ya.".to_string(),
            ),
            status: EntryStatus::Approved,
        },
        JournalEntry {
            id: Uuid::new_v4().to_string(),
            student_id: "student-1".to_string(),
            date: "2024-07-29".to_string(),
            submission_time: "09:00:12".to_string(),
            category: "Kegiatan Ekstrakurikuler".to_string(),
            activity: "Latihan sepak bola bersama teman-teman.".to_string(),
            attendance: Attendance::Present,
            behavior_note: String::new(),
            mood: Mood::Excited,
            reflection: "Sangat menyenangkan bisa mencetak gol hari ini!".to_string(),
            teacher_comment: None,
            status: EntryStatus::Pending,
        },
        JournalEntry {
            id: Uuid::new_v4().to_string(),
            student_id: "student-2".to_string(),
            date: "2024-07-29".to_string(),
            submission_time: "08:30:00".to_string(),
            category: "Kegiatan Pembelajaran".to_string(),
            activity: "Membaca buku cerita di perpustakaan.".to_string(),
            attendance: Attendance::Present,
            behavior_note: String::new(),
            mood: Mood::Happy,
            reflection: "Buku ceritanya sangat menarik dan menginspirasi.".to_string(),
            teacher_comment: Some(
                "Wah, bagus sekali Citra! Terus tingkatkan minat membacamu ya.".to_string(),
            ),
            status: EntryStatus::Approved,
        },
    ]
}

fn count_rows(conn: &Connection, table: &str) -> rusqlite::Result<i64> {
    // Table name comes from a fixed internal call site, never from input.
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
}

/// Seeds the fixed user list iff the table is empty. The count check and
/// the inserts share one transaction, so concurrent cold reads cannot
/// both decide to seed.
pub fn ensure_users_seeded(conn: &Connection) -> anyhow::Result<bool> {
    let tx = conn.unchecked_transaction()?;
    if count_rows(&tx, "users")? > 0 {
        return Ok(false);
    }
    for user in seed_users() {
        db::upsert_user(&tx, &user)?;
    }
    tx.commit()?;
    Ok(true)
}

/// Same guard as [`ensure_users_seeded`], for the journals table.
pub fn ensure_journals_seeded(conn: &Connection) -> anyhow::Result<bool> {
    let tx = conn.unchecked_transaction()?;
    if count_rows(&tx, "journals")? > 0 {
        return Ok(false);
    }
    for entry in seed_journal_entries() {
        db::upsert_journal(&tx, &entry)?;
    }
    tx.commit()?;
    Ok(true)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub users_seeded: bool,
    pub journals_seeded: bool,
    pub categories_seeded: bool,
}

/// POST /seed-data semantics: each collection is seeded independently and
/// only where currently empty. Non-empty collections are left alone.
pub fn seed_if_empty(conn: &Connection) -> anyhow::Result<SeedReport> {
    Ok(SeedReport {
        users_seeded: ensure_users_seeded(conn)?,
        journals_seeded: ensure_journals_seeded(conn)?,
        categories_seeded: settings::seed_categories_if_unset(conn)?,
    })
}

/// Wipes users and journals unconditionally, then reinserts the fixed
/// seed lists and the built-in category list. One transaction: a partial
/// reset can never be observed.
pub fn reset_all(conn: &Connection) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM journals", [])?;
    tx.execute("DELETE FROM users", [])?;
    for user in seed_users() {
        db::upsert_user(&tx, &user)?;
    }
    for entry in seed_journal_entries() {
        db::upsert_journal(&tx, &entry)?;
    }
    settings::reset_categories(&tx)?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn mem_db() -> Connection {
        db::open_db(Path::new(":memory:")).expect("open in-memory db")
    }

    #[test]
    fn users_seed_only_into_an_empty_table() {
        let conn = mem_db();
        assert!(ensure_users_seeded(&conn).expect("first"));
        assert!(!ensure_users_seeded(&conn).expect("second"));
        assert_eq!(count_rows(&conn, "users").expect("count"), 12);

        conn.execute("DELETE FROM users WHERE id <> 'admin-1'", [])
            .expect("trim");
        // One row left: still non-empty, still no reseed.
        assert!(!ensure_users_seeded(&conn).expect("third"));
        assert_eq!(count_rows(&conn, "users").expect("count"), 1);
    }

    #[test]
    fn reset_restores_exactly_the_seed_lists() {
        let conn = mem_db();
        ensure_users_seeded(&conn).expect("seed users");
        ensure_journals_seeded(&conn).expect("seed journals");
        conn.execute("DELETE FROM users WHERE id = 'student-1'", [])
            .expect("delete");
        conn.execute(
            "UPDATE journals SET status = 'Revision Needed'",
            [],
        )
        .expect("mutate");

        reset_all(&conn).expect("reset");
        assert_eq!(count_rows(&conn, "users").expect("count"), 12);
        assert_eq!(count_rows(&conn, "journals").expect("count"), 3);
        let pending: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM journals WHERE status = 'Pending'",
                [],
                |r| r.get(0),
            )
            .expect("pending count");
        assert_eq!(pending, 1);
    }

    #[test]
    fn seed_if_empty_reports_per_collection() {
        let conn = mem_db();
        ensure_users_seeded(&conn).expect("pre-seed users");
        let report = seed_if_empty(&conn).expect("seed");
        assert!(!report.users_seeded);
        assert!(report.journals_seeded);
        assert!(report.categories_seeded);
    }
}
