use serde::{Deserialize, Serialize};

/// One account record. `role` is the serde tag, so the wire shape is the
/// flat object the dashboards expect while the Rust side gets an
/// exhaustive sum type instead of unchecked field access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(flatten)]
    pub profile: UserProfile,
}

/// Everything about a user except the immutable id. POST /users accepts
/// exactly this shape; the server assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub avatar: String,
    pub email: String,
    // Stored, but stripped from every response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(flatten)]
    pub role: RoleFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum RoleFields {
    #[serde(rename = "Siswa", rename_all = "camelCase")]
    Student {
        nisn: String,
        class: String,
        teacher_id: String,
        parent_id: String,
    },
    #[serde(rename = "Guru")]
    Teacher {
        nip: String,
        class: String,
        subject: String,
    },
    #[serde(rename = "Orang Tua", rename_all = "camelCase")]
    Parent { nik: String, child_id: String },
    #[serde(rename = "Admin")]
    Admin { nip: String },
}

impl RoleFields {
    pub fn role_name(&self) -> &'static str {
        match self {
            RoleFields::Student { .. } => "Siswa",
            RoleFields::Teacher { .. } => "Guru",
            RoleFields::Parent { .. } => "Orang Tua",
            RoleFields::Admin { .. } => "Admin",
        }
    }
}

impl User {
    /// Drops the password before the record leaves the server.
    pub fn stripped(mut self) -> User {
        self.profile.password = None;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Attendance {
    #[serde(rename = "Hadir")]
    Present,
    #[serde(rename = "Izin")]
    Excused,
    #[serde(rename = "Sakit")]
    Sick,
    #[serde(rename = "Alpa")]
    Absent,
}

impl Attendance {
    pub fn as_str(self) -> &'static str {
        match self {
            Attendance::Present => "Hadir",
            Attendance::Excused => "Izin",
            Attendance::Sick => "Sakit",
            Attendance::Absent => "Alpa",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Hadir" => Some(Attendance::Present),
            "Izin" => Some(Attendance::Excused),
            "Sakit" => Some(Attendance::Sick),
            "Alpa" => Some(Attendance::Absent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mood {
    #[serde(rename = "Senang")]
    Happy,
    #[serde(rename = "Bersyukur")]
    Grateful,
    #[serde(rename = "Biasa Saja")]
    Neutral,
    #[serde(rename = "Sedih")]
    Sad,
    #[serde(rename = "Marah")]
    Angry,
    #[serde(rename = "Semangat")]
    Excited,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "Senang",
            Mood::Grateful => "Bersyukur",
            Mood::Neutral => "Biasa Saja",
            Mood::Sad => "Sedih",
            Mood::Angry => "Marah",
            Mood::Excited => "Semangat",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Senang" => Some(Mood::Happy),
            "Bersyukur" => Some(Mood::Grateful),
            "Biasa Saja" => Some(Mood::Neutral),
            "Sedih" => Some(Mood::Sad),
            "Marah" => Some(Mood::Angry),
            "Semangat" => Some(Mood::Excited),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Approved,
    #[serde(rename = "Revision Needed")]
    RevisionNeeded,
}

impl EntryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryStatus::Pending => "Pending",
            EntryStatus::Approved => "Approved",
            EntryStatus::RevisionNeeded => "Revision Needed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(EntryStatus::Pending),
            "Approved" => Some(EntryStatus::Approved),
            "Revision Needed" => Some(EntryStatus::RevisionNeeded),
            _ => None,
        }
    }
}

/// One day's submission by one student. `date`, `submissionTime` and
/// `status` are server-assigned at creation and never taken from the
/// client on POST.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: String,
    pub student_id: String,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM:SS
    pub submission_time: String,
    pub category: String,
    pub activity: String,
    pub attendance: Attendance,
    #[serde(default)]
    pub behavior_note: String,
    pub mood: Mood,
    #[serde(default)]
    pub reflection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher_comment: Option<String>,
    pub status: EntryStatus,
}

/// Client payload for POST /journals. No id/date/time/status fields:
/// anything the client sends for those is ignored by construction.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJournalEntry {
    pub student_id: String,
    pub category: String,
    pub activity: String,
    pub attendance: Attendance,
    #[serde(default)]
    pub behavior_note: String,
    pub mood: Mood,
    #[serde(default)]
    pub reflection: String,
}
