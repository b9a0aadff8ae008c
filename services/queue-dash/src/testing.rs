// Test doubles: an in-process fake of the queue API and a scripted source.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use parking_lot::Mutex;
use serde_json::{json, Value};
use svckit::{
    Anonymous, ApiConfig, AssignRequest, ClinicError, Priority, QueueEntry, QueueStatus,
    StatusUpdateRequest, WaitTime, WalkInRequest,
};

use crate::api::{QueueApi, QueueSource, QueueView};

pub fn entry(id: i64, status: QueueStatus) -> QueueEntry {
    let check_in_time = NaiveDate::from_ymd_opt(2026, 10, 17)
        .and_then(|d| d.and_hms_opt(9, (id % 60) as u32, 0))
        .unwrap();
    QueueEntry {
        id,
        clinic_id: 1,
        appointment_id: None,
        animal_id: 40 + id,
        animal_name: format!("Hasta {}", id),
        owner_name: format!("Sahip {}", id),
        queue_number: id as u32,
        status,
        priority: Priority::Normal,
        appointment_type: None,
        check_in_time,
        estimated_start_time: None,
        estimated_wait_minutes: 0,
        veterinarian_id: None,
        veterinarian_name: None,
        room: None,
        notes: None,
    }
}

type Shared = Arc<Mutex<FakeState>>;
type Rejection = (StatusCode, Json<Value>);

struct FakeState {
    entries: Vec<QueueEntry>,
    next_id: i64,
    walk_ins: Vec<WalkInRequest>,
    authorizations: Vec<String>,
    fail_lists: bool,
}

/// Fake `/api/queue` backend bound to an ephemeral local port.
pub struct FakeServer {
    base_url: String,
    state: Shared,
}

impl FakeServer {
    /// Starts with two WAITING, one IN_PROGRESS and one COMPLETED entry.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(FakeState {
            entries: vec![
                entry(1, QueueStatus::Waiting),
                entry(2, QueueStatus::Waiting),
                entry(3, QueueStatus::InProgress),
                entry(4, QueueStatus::Completed),
            ],
            next_id: 5,
            walk_ins: Vec::new(),
            authorizations: Vec::new(),
            fail_lists: false,
        }));

        let router = Router::new()
            .route("/api/queue/active", get(handle_active))
            .route("/api/queue/today", get(handle_today))
            .route(
                "/api/queue/check-in/appointment/:appointment_id",
                post(handle_check_in_appointment),
            )
            .route("/api/queue/check-in/walk-in", post(handle_walk_in))
            .route("/api/queue/:id/status", put(handle_status))
            .route("/api/queue/:id/assign", put(handle_assign))
            .route("/api/queue/:id/wait-time", get(handle_wait_time))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api/queue", addr),
            state,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn fail_lists(&self, fail: bool) {
        self.state.lock().fail_lists = fail;
    }

    pub fn walk_ins(&self) -> Vec<WalkInRequest> {
        self.state.lock().walk_ins.clone()
    }

    pub fn authorizations(&self) -> Vec<String> {
        self.state.lock().authorizations.clone()
    }
}

pub fn fake_api(server: &FakeServer) -> QueueApi {
    let config = ApiConfig {
        base_url: server.base_url(),
        ..ApiConfig::default()
    };
    QueueApi::new(&config, Arc::new(Anonymous))
}

fn record(state: &Shared, headers: &HeaderMap) {
    if let Some(auth) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        state.lock().authorizations.push(auth.to_string());
    }
}

fn not_found() -> Rejection {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Sıra kaydı bulunamadı" })),
    )
}

fn list(state: &Shared, active_only: bool) -> Result<Json<Vec<QueueEntry>>, Rejection> {
    let state = state.lock();
    if state.fail_lists {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "message": "Servis geçici olarak kullanılamıyor" })),
        ));
    }
    Ok(Json(
        state
            .entries
            .iter()
            .filter(|e| !active_only || !e.status.is_terminal())
            .cloned()
            .collect(),
    ))
}

async fn handle_active(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<QueueEntry>>, Rejection> {
    record(&state, &headers);
    list(&state, true)
}

async fn handle_today(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Vec<QueueEntry>>, Rejection> {
    record(&state, &headers);
    list(&state, false)
}

fn push_new(state: &Shared, build: impl FnOnce(&mut QueueEntry)) -> QueueEntry {
    let mut state = state.lock();
    let id = state.next_id;
    state.next_id += 1;
    let mut new_entry = entry(id, QueueStatus::Waiting);
    build(&mut new_entry);
    state.entries.push(new_entry.clone());
    new_entry
}

async fn handle_check_in_appointment(
    State(state): State<Shared>,
    Path(appointment_id): Path<i64>,
    headers: HeaderMap,
) -> Json<QueueEntry> {
    record(&state, &headers);
    Json(push_new(&state, |e| e.appointment_id = Some(appointment_id)))
}

async fn handle_walk_in(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(request): Json<WalkInRequest>,
) -> Json<QueueEntry> {
    record(&state, &headers);
    state.lock().walk_ins.push(request.clone());
    Json(push_new(&state, |e| {
        e.animal_id = request.animal_id;
        e.priority = request.priority;
        e.appointment_type = Some(request.appointment_type);
        e.notes = request.notes.clone();
    }))
}

async fn handle_status(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<QueueEntry>, Rejection> {
    record(&state, &headers);
    let mut state = state.lock();
    let found = state.entries.iter_mut().find(|e| e.id == id).ok_or_else(not_found)?;
    found.status = request.status;
    Ok(Json(found.clone()))
}

async fn handle_assign(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(request): Json<AssignRequest>,
) -> Result<Json<QueueEntry>, Rejection> {
    record(&state, &headers);
    let mut state = state.lock();
    let found = state.entries.iter_mut().find(|e| e.id == id).ok_or_else(not_found)?;
    found.veterinarian_id = Some(request.veterinarian_id);
    found.veterinarian_name = Some(format!("Veteriner {}", request.veterinarian_id));
    found.room = request.room.map(|r| r.label().to_string());
    Ok(Json(found.clone()))
}

async fn handle_wait_time(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<WaitTime>, Rejection> {
    record(&state, &headers);
    let state = state.lock();
    let position = state
        .entries
        .iter()
        .filter(|e| e.status == QueueStatus::Waiting)
        .position(|e| e.id == id)
        .ok_or_else(not_found)?;
    Ok(Json(WaitTime {
        estimated_wait_minutes: (position as i64 + 1) * 10,
    }))
}

/// Source that replays canned list results and counts every call.
#[derive(Default)]
pub struct ScriptedSource {
    lists: Mutex<VecDeque<Result<Vec<QueueEntry>, ClinicError>>>,
    mutation_error: Mutex<Option<ClinicError>>,
    pub list_calls: AtomicUsize,
    pub mutation_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_list(&self, result: Result<Vec<QueueEntry>, ClinicError>) {
        self.lists.lock().push_back(result);
    }

    pub fn fail_mutations(&self, err: ClinicError) {
        *self.mutation_error.lock() = Some(err);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    fn mutate(&self, result: QueueEntry) -> Result<QueueEntry, ClinicError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        match self.mutation_error.lock().clone() {
            Some(err) => Err(err),
            None => Ok(result),
        }
    }
}

#[async_trait]
impl QueueSource for ScriptedSource {
    async fn list(&self, _view: QueueView) -> Result<Vec<QueueEntry>, ClinicError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.lists.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn check_in_appointment(&self, appointment_id: i64) -> Result<QueueEntry, ClinicError> {
        let mut created = entry(100, QueueStatus::Waiting);
        created.appointment_id = Some(appointment_id);
        self.mutate(created)
    }

    async fn check_in_walk_in(&self, request: &WalkInRequest) -> Result<QueueEntry, ClinicError> {
        let mut created = entry(101, QueueStatus::Waiting);
        created.animal_id = request.animal_id;
        self.mutate(created)
    }

    async fn update_status(&self, id: i64, status: QueueStatus) -> Result<QueueEntry, ClinicError> {
        self.mutate(entry(id, status))
    }

    async fn assign(&self, id: i64, request: &AssignRequest) -> Result<QueueEntry, ClinicError> {
        let mut assigned = entry(id, QueueStatus::Waiting);
        assigned.veterinarian_id = Some(request.veterinarian_id);
        self.mutate(assigned)
    }

    async fn wait_time(&self, _id: i64) -> Result<WaitTime, ClinicError> {
        Ok(WaitTime {
            estimated_wait_minutes: 15,
        })
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
