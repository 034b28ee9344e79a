use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// The four synchronized entity types. Field names on the wire follow the
/// upstream server (Portuguese collection names, `EscolaId`-style foreign
/// keys); the Rust side uses the English domain terms throughout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    School,
    Class,
    Student,
    Attendance,
}

impl EntityKind {
    /// Parents before children, matching the foreign-key direction. Both the
    /// push and the pull phase walk types in this order so the server never
    /// sees a child referencing a parent it does not know yet.
    pub const SYNC_ORDER: [EntityKind; 4] = [
        EntityKind::School,
        EntityKind::Class,
        EntityKind::Student,
        EntityKind::Attendance,
    ];

    pub fn collection(self) -> &'static str {
        match self {
            EntityKind::School => "escolas",
            EntityKind::Class => "turmas",
            EntityKind::Student => "alunos",
            EntityKind::Attendance => "presencas",
        }
    }

    pub fn list_path(self) -> String {
        format!("/api/{}", self.collection())
    }

    pub fn sync_path(self) -> String {
        format!("/api/{}/sync", self.collection())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct School {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub synced: bool,
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, rename = "lastSync", skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    /// Nullable on purpose: a class whose school was deleted stays around as
    /// an orphan so student history is preserved.
    #[serde(default, rename = "EscolaId")]
    pub school_id: Option<i64>,
    #[serde(default)]
    pub synced: bool,
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, rename = "lastSync", skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, rename = "TurmaId")]
    pub class_id: Option<i64>,
    /// Denormalized read projection of this student's attendance rows, filled
    /// from the attendance table on list reads. The attendance collection is
    /// the source of truth; this list is never written back.
    #[serde(default, rename = "Presencas", skip_serializing_if = "Vec::is_empty")]
    pub attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    pub synced: bool,
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, rename = "lastSync", skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "AlunoId")]
    pub student_id: i64,
    /// Calendar day, `YYYY-MM-DD`. Together with `student_id` this is the
    /// upsert key: there is never more than one row per student per day.
    pub date: String,
    pub present: bool,
    #[serde(default, rename = "observacao", skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,
    #[serde(default)]
    pub synced: bool,
    #[serde(default, rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, rename = "lastSync", skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn today() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Validate and canonicalize a `YYYY-MM-DD` day string.
pub fn parse_day(s: &str) -> Option<String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}
