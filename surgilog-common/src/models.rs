//! Data models shared between the database layer and the HTTP API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Role attached to a login account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Resident,
}

impl Role {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Resident => "resident",
        }
    }

    /// Parse the database representation
    pub fn parse(s: &str) -> Result<Role> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "resident" => Ok(Role::Resident),
            other => Err(Error::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}

/// Review state of a record
///
/// A freshly created record carries no status at all (`Option<RecordStatus>`
/// is `None`); that absence is the draft state. Once a teacher has acted, the
/// record is either `reviewed` or `corrected`, and a corrected record is
/// acknowledged back to `reviewed` when a resident or teacher next views it.
/// No path ever returns a record to draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Draft,
    Reviewed,
    Corrected,
}

impl RecordStatus {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Draft => "draft",
            RecordStatus::Reviewed => "reviewed",
            RecordStatus::Corrected => "corrected",
        }
    }

    /// Parse the database representation
    pub fn parse(s: &str) -> Result<RecordStatus> {
        match s {
            "draft" => Ok(RecordStatus::Draft),
            "reviewed" => Ok(RecordStatus::Reviewed),
            "corrected" => Ok(RecordStatus::Corrected),
            other => Err(Error::InvalidInput(format!(
                "Unknown record status: {}",
                other
            ))),
        }
    }
}

/// Login account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub role: Role,
    /// Resident or teacher row this login belongs to (none for admins)
    pub profile_guid: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Authenticated caller, resolved from a session token by the auth middleware
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub user_guid: String,
    pub username: String,
    pub role: Role,
    pub profile_guid: Option<String>,
}

/// Session row backing a login token
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_guid: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Trainee performing surgeries and completing records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
    pub guid: String,
    pub name: String,
    pub email: String,
    pub training_year: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Supervisor reviewing and correcting records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub guid: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Organizational grouping of residents and teachers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub guid: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Area with its ordered membership lists populated
#[derive(Debug, Clone, Serialize)]
pub struct AreaDetail {
    #[serde(flatten)]
    pub area: Area,
    pub residents: Vec<Resident>,
    pub teachers: Vec<Teacher>,
}

/// Procedure template: steps and grading guidelines, independent of any
/// specific performance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Surgery {
    pub guid: String,
    pub name: String,
    pub description: String,
    /// Ordered step descriptions
    pub steps: Vec<String>,
    /// Grading guidance text
    pub guidelines: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-step grade written by the resident when completing a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvaluation {
    pub step: String,
    pub grade: i64,
    #[serde(default)]
    pub note: Option<String>,
}

/// One performance of a surgery by a resident under teacher supervision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub guid: String,
    pub surgery_guid: String,
    pub resident_guid: String,
    pub teacher_guid: String,
    pub area_guid: String,
    pub performed_at: DateTime<Utc>,
    /// `None` until a teacher has reviewed or corrected the record
    pub status: Option<RecordStatus>,
    pub judgment: Option<String>,
    pub comment: Option<String>,
    pub step_evaluations: Vec<StepEvaluation>,
    pub teacher_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Record with related entity names populated for display
#[derive(Debug, Clone, Serialize)]
pub struct RecordDetail {
    #[serde(flatten)]
    pub record: Record,
    pub surgery_name: String,
    pub resident_name: String,
    pub teacher_name: String,
    pub area_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_database_form() {
        for role in [Role::Admin, Role::Teacher, Role::Resident] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn unknown_role_rejected() {
        assert!(Role::parse("superuser").is_err());
    }

    #[test]
    fn record_status_round_trips_through_database_form() {
        for status in [
            RecordStatus::Draft,
            RecordStatus::Reviewed,
            RecordStatus::Corrected,
        ] {
            assert_eq!(RecordStatus::parse(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn step_evaluation_serializes_without_note() {
        let eval = StepEvaluation {
            step: "incision".to_string(),
            grade: 4,
            note: None,
        };
        let json = serde_json::to_string(&eval).unwrap();
        let back: StepEvaluation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, eval);
    }
}
