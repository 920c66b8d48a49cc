use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db;

pub const CATEGORIES_KEY: &str = "settings.journalCategories";
pub const ATTENDANCE_WINDOW_KEY: &str = "settings.attendanceWindow";
pub const SCHOOL_NAME_KEY: &str = "settings.schoolName";
pub const THEME_KEY: &str = "settings.theme";

pub const DEFAULT_CATEGORIES: [&str; 5] = [
    "Kegiatan Pembelajaran",
    "Kegiatan Ekstrakurikuler",
    "Kegiatan Organisasi",
    "Kegiatan Ibadah",
    "Kegiatan Literasi",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceWindow {
    /// HH:MM
    pub start_time: String,
    /// HH:MM
    pub end_time: String,
}

impl Default for AttendanceWindow {
    fn default() -> Self {
        AttendanceWindow {
            start_time: "07:00".to_string(),
            end_time: "09:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

/// The global, admin-mutated singleton. Loaded with defaults for any key
/// never written, persisted key-by-key on change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub journal_categories: Vec<String>,
    pub attendance_window: AttendanceWindow,
    pub school_name: String,
    pub theme: Theme,
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            journal_categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            attendance_window: AttendanceWindow::default(),
            school_name: String::new(),
            theme: Theme::Light,
        }
    }
}

/// Owner of the settings lifecycle: constructed once at startup, handed
/// to handlers through the router state, loads with defaults and writes
/// back on every change.
#[derive(Clone)]
pub struct SettingsService {
    db: db::Db,
}

impl SettingsService {
    pub fn new(db: db::Db) -> Self {
        SettingsService { db }
    }

    pub fn load(&self) -> anyhow::Result<AppSettings> {
        load(&db::conn(&self.db))
    }

    pub fn save(&self, settings: &AppSettings) -> anyhow::Result<()> {
        store(&db::conn(&self.db), settings)
    }
}

pub fn load(conn: &Connection) -> anyhow::Result<AppSettings> {
    let mut settings = AppSettings::default();
    if let Some(v) = db::settings_get_json(conn, CATEGORIES_KEY)? {
        if let Ok(categories) = serde_json::from_value::<Vec<String>>(v) {
            settings.journal_categories = categories;
        }
    }
    if let Some(v) = db::settings_get_json(conn, ATTENDANCE_WINDOW_KEY)? {
        if let Ok(window) = serde_json::from_value::<AttendanceWindow>(v) {
            settings.attendance_window = window;
        }
    }
    if let Some(v) = db::settings_get_json(conn, SCHOOL_NAME_KEY)? {
        if let Some(name) = v.as_str() {
            settings.school_name = name.to_string();
        }
    }
    if let Some(v) = db::settings_get_json(conn, THEME_KEY)? {
        if let Ok(theme) = serde_json::from_value::<Theme>(v) {
            settings.theme = theme;
        }
    }
    Ok(settings)
}

pub fn store(conn: &Connection, settings: &AppSettings) -> anyhow::Result<()> {
    db::settings_set_json(
        conn,
        CATEGORIES_KEY,
        &serde_json::to_value(&settings.journal_categories)?,
    )?;
    db::settings_set_json(
        conn,
        ATTENDANCE_WINDOW_KEY,
        &serde_json::to_value(&settings.attendance_window)?,
    )?;
    db::settings_set_json(conn, SCHOOL_NAME_KEY, &Value::String(settings.school_name.clone()))?;
    db::settings_set_json(conn, THEME_KEY, &serde_json::to_value(settings.theme)?)?;
    Ok(())
}

/// Writes the built-in category list, but only when nothing has ever been
/// stored under the categories slot.
pub fn seed_categories_if_unset(conn: &Connection) -> anyhow::Result<bool> {
    if db::settings_get_json(conn, CATEGORIES_KEY)?.is_some() {
        return Ok(false);
    }
    db::settings_set_json(
        conn,
        CATEGORIES_KEY,
        &serde_json::to_value(DEFAULT_CATEGORIES.map(String::from).to_vec())?,
    )?;
    Ok(true)
}

pub fn reset_categories(conn: &Connection) -> anyhow::Result<()> {
    db::settings_set_json(
        conn,
        CATEGORIES_KEY,
        &serde_json::to_value(DEFAULT_CATEGORIES.map(String::from).to_vec())?,
    )
}

fn parse_hhmm(s: &str) -> Option<(u32, u32)> {
    let (h, m) = s.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    let h: u32 = h.parse().ok()?;
    let m: u32 = m.parse().ok()?;
    if h > 23 || m > 59 {
        return None;
    }
    Some((h, m))
}

/// Validated merge of a PUT /settings patch into the current settings.
/// Unknown fields and out-of-range values are rejected whole, nothing is
/// persisted by this function.
pub fn merge_patch(current: &mut AppSettings, patch: &Map<String, Value>) -> Result<(), String> {
    for (k, v) in patch {
        match k.as_str() {
            "journalCategories" => {
                let raw: Vec<String> = serde_json::from_value(v.clone())
                    .map_err(|_| "journalCategories must be an array of strings".to_string())?;
                let categories: Vec<String> =
                    raw.iter().map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect();
                if categories.is_empty() {
                    return Err("journalCategories must contain at least one category".into());
                }
                current.journal_categories = categories;
            }
            "attendanceWindow" => {
                let window: AttendanceWindow = serde_json::from_value(v.clone())
                    .map_err(|_| "attendanceWindow must have startTime and endTime".to_string())?;
                let start = parse_hhmm(&window.start_time)
                    .ok_or_else(|| "attendanceWindow.startTime must be HH:MM".to_string())?;
                let end = parse_hhmm(&window.end_time)
                    .ok_or_else(|| "attendanceWindow.endTime must be HH:MM".to_string())?;
                if start >= end {
                    return Err("attendanceWindow.startTime must be before endTime".into());
                }
                current.attendance_window = window;
            }
            "schoolName" => {
                let name = v
                    .as_str()
                    .ok_or_else(|| "schoolName must be a string".to_string())?
                    .trim();
                if name.len() > 120 {
                    return Err("schoolName length must be <= 120".into());
                }
                current.school_name = name.to_string();
            }
            "theme" => {
                current.theme = serde_json::from_value(v.clone())
                    .map_err(|_| "theme must be one of: light, dark".to_string())?;
            }
            _ => return Err(format!("unknown settings field: {}", k)),
        }
    }
    Ok(())
}
