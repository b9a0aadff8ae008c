// services/queue-dash/src/actions.rs
//
// Queue mutations: validate locally, show as pending, send, then re-fetch

use std::sync::Arc;

use svckit::{ClinicError, QueueEntry, QueueStatus, WaitTime};
use tracing::{info, warn};

use crate::api::QueueSource;
use crate::forms::{AssignForm, WalkInForm};
use crate::store::{PendingChange, QueueStore};

/// Issues mutations through the data source and keeps the store in step.
///
/// The direct response of a mutation is only handed back to the caller
/// (for a receipt or a log line); the list itself always comes from the
/// re-fetch that follows every mutation.
pub struct QueueController {
    source: Arc<dyn QueueSource>,
    store: Arc<QueueStore>,
}

impl QueueController {
    pub fn new(source: Arc<dyn QueueSource>, store: Arc<QueueStore>) -> Self {
        Self { source, store }
    }

    pub fn store(&self) -> &Arc<QueueStore> {
        &self.store
    }

    pub fn describe_source(&self) -> String {
        self.source.describe()
    }

    pub async fn check_in_appointment(
        &self,
        appointment_id: i64,
    ) -> Result<QueueEntry, ClinicError> {
        let result = self.source.check_in_appointment(appointment_id).await;
        match &result {
            Ok(entry) => info!(
                "Appointment {} checked in as queue #{}",
                appointment_id, entry.queue_number
            ),
            Err(e) => warn!("Appointment {} check-in failed: {}", appointment_id, e),
        }
        self.store.refresh().await;
        result
    }

    /// Rejected before any request when no patient is selected.
    pub async fn check_in_walk_in(&self, form: &WalkInForm) -> Result<QueueEntry, ClinicError> {
        let request = form.validate()?;
        let result = self.source.check_in_walk_in(&request).await;
        match &result {
            Ok(entry) => info!(
                "Walk-in animal {} checked in as queue #{}",
                request.animal_id, entry.queue_number
            ),
            Err(e) => warn!("Walk-in check-in for animal {} failed: {}", request.animal_id, e),
        }
        self.store.refresh().await;
        result
    }

    pub async fn update_status(
        &self,
        id: i64,
        status: QueueStatus,
    ) -> Result<QueueEntry, ClinicError> {
        self.store.mark_pending(id, PendingChange::Status(status));
        let result = self.source.update_status(id, status).await;
        self.settle(id, &result, "status update");
        self.store.refresh().await;
        result
    }

    pub async fn start(&self, id: i64) -> Result<QueueEntry, ClinicError> {
        self.update_status(id, QueueStatus::InProgress).await
    }

    pub async fn complete(&self, id: i64) -> Result<QueueEntry, ClinicError> {
        self.update_status(id, QueueStatus::Completed).await
    }

    /// Rejected before any request when no veterinarian is chosen.
    pub async fn assign(&self, id: i64, form: &AssignForm) -> Result<QueueEntry, ClinicError> {
        let request = form.validate()?;
        self.store.mark_pending(
            id,
            PendingChange::Assignment {
                veterinarian_id: request.veterinarian_id,
                room: request.room,
            },
        );
        let result = self.source.assign(id, &request).await;
        self.settle(id, &result, "assignment");
        self.store.refresh().await;
        result
    }

    pub async fn wait_time(&self, id: i64) -> Result<WaitTime, ClinicError> {
        self.source.wait_time(id).await
    }

    fn settle(&self, id: i64, result: &Result<QueueEntry, ClinicError>, what: &str) {
        match result {
            Ok(_) => {
                info!("Queue entry {} {} accepted", id, what);
                self.store.confirm_pending(id);
            }
            Err(e) => {
                warn!("Queue entry {} {} rejected: {}", id, what, e);
                self.store.discard_pending(id);
            }
        }
    }
}
