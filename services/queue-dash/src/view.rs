// services/queue-dash/src/view.rs
//
// Display derivations for queue rows: labels, tones, wait text, actions

use svckit::{AppointmentType, Priority, QueueEntry, QueueStatus};

use crate::store::QueueRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAction {
    Assign,
    Start,
    Complete,
}

impl QueueAction {
    pub fn label(self) -> &'static str {
        match self {
            QueueAction::Assign => "Ata",
            QueueAction::Start => "Başlat",
            QueueAction::Complete => "Tamamla",
        }
    }

    pub fn key(self) -> char {
        match self {
            QueueAction::Assign => 'a',
            QueueAction::Start => 's',
            QueueAction::Complete => 'c',
        }
    }
}

/// Actions offered for the displayed status. The server remains the judge
/// of whether a transition is allowed.
pub fn actions_for(status: QueueStatus) -> &'static [QueueAction] {
    match status {
        QueueStatus::Waiting => &[QueueAction::Assign, QueueAction::Start],
        QueueStatus::InProgress => &[QueueAction::Complete],
        QueueStatus::Completed | QueueStatus::Cancelled | QueueStatus::NoShow => &[],
    }
}

/// Like [`actions_for`], but a row waiting on an unconfirmed change offers
/// nothing until the next poll settles it.
pub fn row_actions(row: &QueueRow) -> &'static [QueueAction] {
    if row.pending {
        &[]
    } else {
        actions_for(row.entry.status)
    }
}

pub fn format_wait(minutes: i64) -> String {
    if minutes <= 0 {
        "Hazır".to_string()
    } else if minutes >= 60 {
        format!("{}s {}dk", minutes / 60, minutes % 60)
    } else {
        format!("{}dk", minutes)
    }
}

pub fn status_label(status: QueueStatus) -> &'static str {
    match status {
        QueueStatus::Waiting => "Bekliyor",
        QueueStatus::InProgress => "Muayenede",
        QueueStatus::Completed => "Tamamlandı",
        QueueStatus::Cancelled => "İptal",
        QueueStatus::NoShow => "Gelmedi",
    }
}

pub fn priority_label(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "Düşük",
        Priority::Normal => "Normal",
        Priority::High => "Yüksek",
        Priority::Urgent => "Acil",
        Priority::Emergency => "Kritik",
    }
}

pub fn appointment_type_label(kind: AppointmentType) -> &'static str {
    match kind {
        AppointmentType::Examination => "Muayene",
        AppointmentType::Vaccination => "Aşı",
        AppointmentType::Surgery => "Ameliyat",
        AppointmentType::Checkup => "Kontrol",
        AppointmentType::Emergency => "Acil",
        AppointmentType::Grooming => "Bakım",
    }
}

/// Colour intent, mapped onto the palette by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Muted,
    Info,
    Success,
    Warning,
    Danger,
}

pub fn status_tone(status: QueueStatus) -> Tone {
    match status {
        QueueStatus::Waiting => Tone::Warning,
        QueueStatus::InProgress => Tone::Info,
        QueueStatus::Completed => Tone::Success,
        QueueStatus::Cancelled => Tone::Muted,
        QueueStatus::NoShow => Tone::Danger,
    }
}

pub fn priority_tone(priority: Priority) -> Tone {
    match priority {
        Priority::Low => Tone::Muted,
        Priority::Normal => Tone::Info,
        Priority::High => Tone::Warning,
        Priority::Urgent | Priority::Emergency => Tone::Danger,
    }
}

/// Veterinarian and room, or "-" when nothing is assigned yet.
pub fn assignment_text(entry: &QueueEntry) -> String {
    let vet = entry
        .veterinarian_name
        .clone()
        .or_else(|| entry.veterinarian_id.map(|id| format!("Vet #{}", id)));
    match (vet, entry.room.as_deref()) {
        (Some(vet), Some(room)) => format!("{} / {}", vet, room),
        (Some(vet), None) => vet,
        (None, Some(room)) => room.to_string(),
        (None, None) => "-".to_string(),
    }
}

/// Wait column text. Only waiting entries have a meaningful estimate.
pub fn wait_text(entry: &QueueEntry) -> String {
    match entry.status {
        QueueStatus::Waiting => format_wait(entry.estimated_wait_minutes),
        _ => "-".to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueSummary {
    pub waiting: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub total: usize,
}

impl QueueSummary {
    pub fn from_rows(rows: &[QueueRow]) -> Self {
        rows.iter().fold(Self::default(), |mut summary, row| {
            match row.entry.status {
                QueueStatus::Waiting => summary.waiting += 1,
                QueueStatus::InProgress => summary.in_progress += 1,
                QueueStatus::Completed => summary.completed += 1,
                QueueStatus::Cancelled | QueueStatus::NoShow => {}
            }
            summary.total += 1;
            summary
        })
    }
}
