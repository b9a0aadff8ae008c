use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStatus {
    Waiting,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl QueueStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            QueueStatus::Completed | QueueStatus::Cancelled | QueueStatus::NoShow
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueueStatus::Waiting => "WAITING",
            QueueStatus::InProgress => "IN_PROGRESS",
            QueueStatus::Completed => "COMPLETED",
            QueueStatus::Cancelled => "CANCELLED",
            QueueStatus::NoShow => "NO_SHOW",
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Advisory only. Never used to reorder the queue on the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
    Emergency,
}

impl Priority {
    pub const ALL: [Priority; 5] = [
        Priority::Low,
        Priority::Normal,
        Priority::High,
        Priority::Urgent,
        Priority::Emergency,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentType {
    #[default]
    Examination,
    Vaccination,
    Surgery,
    Checkup,
    Emergency,
    Grooming,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 6] = [
        AppointmentType::Examination,
        AppointmentType::Vaccination,
        AppointmentType::Surgery,
        AppointmentType::Checkup,
        AppointmentType::Emergency,
        AppointmentType::Grooming,
    ];
}

/// Rooms a patient can be assigned to. The list is fixed on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Room {
    #[serde(rename = "Muayene 1")]
    Exam1,
    #[serde(rename = "Muayene 2")]
    Exam2,
    #[serde(rename = "Muayene 3")]
    Exam3,
    #[serde(rename = "Ameliyathane")]
    Surgery,
    #[serde(rename = "Acil Oda")]
    Emergency,
}

impl Room {
    pub const ALL: [Room; 5] = [
        Room::Exam1,
        Room::Exam2,
        Room::Exam3,
        Room::Surgery,
        Room::Emergency,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Room::Exam1 => "Muayene 1",
            Room::Exam2 => "Muayene 2",
            Room::Exam3 => "Muayene 3",
            Room::Surgery => "Ameliyathane",
            Room::Emergency => "Acil Oda",
        }
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A patient's position and state in the clinic's live queue.
/// Owned by the server; the client only ever holds a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: i64,
    pub clinic_id: i64,
    #[serde(default)]
    pub appointment_id: Option<i64>,
    pub animal_id: i64,
    pub animal_name: String,
    pub owner_name: String,
    pub queue_number: u32,
    pub status: QueueStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub appointment_type: Option<AppointmentType>,
    pub check_in_time: NaiveDateTime,
    #[serde(default)]
    pub estimated_start_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub estimated_wait_minutes: i64,
    #[serde(default)]
    pub veterinarian_id: Option<i64>,
    #[serde(default)]
    pub veterinarian_name: Option<String>,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalkInRequest {
    pub animal_id: i64,
    pub appointment_type: AppointmentType,
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: QueueStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub veterinarian_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<Room>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitTime {
    pub estimated_wait_minutes: i64,
}
