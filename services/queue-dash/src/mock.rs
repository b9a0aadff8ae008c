// services/queue-dash/src/mock.rs
//
// In-memory queue for demo mode
//
// Plays the backend's part: assigns queue numbers, estimates waits and
// rejects transitions out of terminal states. Never used as a fallback
// for a failing live API.

use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDateTime};
use parking_lot::Mutex;
use rand::Rng;
use svckit::{
    AppointmentType, AssignRequest, ClinicError, Priority, QueueEntry, QueueStatus, WaitTime,
    WalkInRequest,
};
use tracing::debug;

use crate::api::{QueueSource, QueueView};

const CLINIC_ID: i64 = 1;
const MINUTES_PER_PATIENT: i64 = 15;

const PATIENTS: [(i64, &str, &str); 8] = [
    (42, "Pamuk", "Ayşe Yılmaz"),
    (43, "Karabaş", "Mehmet Öz"),
    (44, "Boncuk", "Selin Acar"),
    (45, "Tarçın", "Can Yıldız"),
    (46, "Minnoş", "Deniz Şahin"),
    (47, "Zeytin", "Burak Çelik"),
    (48, "Fıstık", "Elif Arslan"),
    (49, "Duman", "Oğuz Kılıç"),
];

const VETERINARIANS: [(i64, &str); 3] = [
    (5, "Dr. Elif Kaya"),
    (6, "Dr. Murat Demir"),
    (7, "Dr. Zeynep Aydın"),
];

struct MockState {
    entries: Vec<QueueEntry>,
    next_id: i64,
    next_number: u32,
}

pub struct MockQueue {
    state: Mutex<MockState>,
    /// Chance per list call that a random walk-in shows up.
    arrival_ratio: Option<(u32, u32)>,
}

impl MockQueue {
    /// Seeded clinic morning without random arrivals.
    pub fn new() -> Self {
        let now = Local::now().naive_local();
        let mut mock = Self {
            state: Mutex::new(MockState {
                entries: Vec::new(),
                next_id: 1,
                next_number: 1,
            }),
            arrival_ratio: None,
        };

        let seed = [
            (42, QueueStatus::Completed, Priority::Normal, 95),
            (43, QueueStatus::InProgress, Priority::High, 40),
            (44, QueueStatus::Waiting, Priority::Normal, 25),
            (45, QueueStatus::Waiting, Priority::Emergency, 10),
            (46, QueueStatus::Waiting, Priority::Low, 3),
        ];
        {
            let state = mock.state.get_mut();
            for (animal_id, status, priority, minutes_ago) in seed {
                let mut entry = new_entry(state, animal_id, now - Duration::minutes(minutes_ago));
                entry.status = status;
                entry.priority = priority;
                entry.appointment_type = Some(AppointmentType::Examination);
                if status == QueueStatus::InProgress {
                    entry.veterinarian_id = Some(VETERINARIANS[0].0);
                    entry.veterinarian_name = Some(VETERINARIANS[0].1.to_string());
                    entry.room = Some("Muayene 1".to_string());
                }
                state.entries.push(entry);
            }
            estimate_waits(&mut state.entries);
        }
        mock
    }

    /// Adds a random walk-in on roughly `numerator` of every `denominator`
    /// list calls, so the demo queue keeps moving.
    pub fn with_arrivals(mut self, numerator: u32, denominator: u32) -> Self {
        self.arrival_ratio = Some((numerator, denominator));
        self
    }

    fn maybe_arrive(&self, state: &mut MockState) {
        let Some((numerator, denominator)) = self.arrival_ratio else {
            return;
        };
        let mut rng = rand::thread_rng();
        if !rng.gen_ratio(numerator, denominator) {
            return;
        }
        let (animal_id, _, _) = PATIENTS[rng.gen_range(0..PATIENTS.len())];
        let mut entry = new_entry(state, animal_id, Local::now().naive_local());
        entry.priority = Priority::ALL[rng.gen_range(0..Priority::ALL.len())];
        entry.appointment_type = Some(AppointmentType::Examination);
        debug!("Demo arrival: {} as #{}", entry.animal_name, entry.queue_number);
        state.entries.push(entry);
    }
}

impl Default for MockQueue {
    fn default() -> Self {
        Self::new()
    }
}

fn patient(animal_id: i64) -> Option<(i64, &'static str, &'static str)> {
    PATIENTS.iter().copied().find(|(id, _, _)| *id == animal_id)
}

fn new_entry(state: &mut MockState, animal_id: i64, check_in_time: NaiveDateTime) -> QueueEntry {
    let (_, animal_name, owner_name) =
        patient(animal_id).unwrap_or((animal_id, "Bilinmeyen", "Bilinmeyen"));
    let entry = QueueEntry {
        id: state.next_id,
        clinic_id: CLINIC_ID,
        appointment_id: None,
        animal_id,
        animal_name: animal_name.to_string(),
        owner_name: owner_name.to_string(),
        queue_number: state.next_number,
        status: QueueStatus::Waiting,
        priority: Priority::Normal,
        appointment_type: None,
        check_in_time,
        estimated_start_time: None,
        estimated_wait_minutes: 0,
        veterinarian_id: None,
        veterinarian_name: None,
        room: None,
        notes: None,
    };
    state.next_id += 1;
    state.next_number += 1;
    entry
}

fn estimate_waits(entries: &mut [QueueEntry]) {
    let now = Local::now().naive_local();
    let mut ahead = 0;
    for entry in entries.iter_mut() {
        if entry.status == QueueStatus::Waiting {
            let minutes = ahead * MINUTES_PER_PATIENT;
            entry.estimated_wait_minutes = minutes;
            entry.estimated_start_time = Some(now + Duration::minutes(minutes));
            ahead += 1;
        } else {
            entry.estimated_wait_minutes = 0;
            entry.estimated_start_time = None;
        }
    }
}

fn not_found(id: i64) -> ClinicError {
    ClinicError::Server {
        status: 404,
        message: format!("Sıra kaydı bulunamadı: {}", id),
    }
}

#[async_trait]
impl QueueSource for MockQueue {
    async fn list(&self, view: QueueView) -> Result<Vec<QueueEntry>, ClinicError> {
        let mut state = self.state.lock();
        self.maybe_arrive(&mut state);
        estimate_waits(&mut state.entries);
        Ok(state
            .entries
            .iter()
            .filter(|e| view == QueueView::Today || !e.status.is_terminal())
            .cloned()
            .collect())
    }

    async fn check_in_appointment(&self, appointment_id: i64) -> Result<QueueEntry, ClinicError> {
        let mut state = self.state.lock();
        if let Some(existing) = state
            .entries
            .iter()
            .find(|e| e.appointment_id == Some(appointment_id))
        {
            return Ok(existing.clone());
        }
        let animal_id = PATIENTS[(appointment_id.unsigned_abs() as usize) % PATIENTS.len()].0;
        let mut entry = new_entry(&mut state, animal_id, Local::now().naive_local());
        entry.appointment_id = Some(appointment_id);
        entry.appointment_type = Some(AppointmentType::Checkup);
        state.entries.push(entry);
        estimate_waits(&mut state.entries);
        state.entries.last().cloned().ok_or_else(|| not_found(0))
    }

    async fn check_in_walk_in(&self, request: &WalkInRequest) -> Result<QueueEntry, ClinicError> {
        if patient(request.animal_id).is_none() {
            return Err(ClinicError::Server {
                status: 404,
                message: format!("Hasta bulunamadı: {}", request.animal_id),
            });
        }
        let mut state = self.state.lock();
        let mut entry = new_entry(&mut state, request.animal_id, Local::now().naive_local());
        entry.priority = request.priority;
        entry.appointment_type = Some(request.appointment_type);
        entry.notes = request.notes.clone();
        state.entries.push(entry);
        estimate_waits(&mut state.entries);
        state.entries.last().cloned().ok_or_else(|| not_found(0))
    }

    async fn update_status(&self, id: i64, status: QueueStatus) -> Result<QueueEntry, ClinicError> {
        let mut state = self.state.lock();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found(id))?;
        if entry.status.is_terminal() {
            return Err(ClinicError::Server {
                status: 409,
                message: format!("Kayıt zaten kapalı: {}", entry.status),
            });
        }
        entry.status = status;
        let updated = entry.clone();
        estimate_waits(&mut state.entries);
        Ok(updated)
    }

    async fn assign(&self, id: i64, request: &AssignRequest) -> Result<QueueEntry, ClinicError> {
        let (vet_id, vet_name) = VETERINARIANS
            .iter()
            .copied()
            .find(|(vet_id, _)| *vet_id == request.veterinarian_id)
            .ok_or_else(|| ClinicError::Server {
                status: 404,
                message: format!("Veteriner bulunamadı: {}", request.veterinarian_id),
            })?;
        let mut state = self.state.lock();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found(id))?;
        entry.veterinarian_id = Some(vet_id);
        entry.veterinarian_name = Some(vet_name.to_string());
        entry.room = request.room.map(|r| r.label().to_string());
        Ok(entry.clone())
    }

    async fn wait_time(&self, id: i64) -> Result<WaitTime, ClinicError> {
        let mut state = self.state.lock();
        estimate_waits(&mut state.entries);
        let entry = state
            .entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found(id))?;
        Ok(WaitTime {
            estimated_wait_minutes: entry.estimated_wait_minutes,
        })
    }

    fn describe(&self) -> String {
        "demo fixtures".to_string()
    }
}
