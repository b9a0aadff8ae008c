// services/queue-dash/src/api.rs
//
// Queue resource client: maps queue operations onto /api/queue endpoints

use std::sync::Arc;

use async_trait::async_trait;
use svckit::{
    ApiResponse, AssignRequest, ClinicError, CredentialSource, HttpTransport, QueueEntry,
    QueueStatus, RequestOptions, StatusUpdateRequest, WaitTime, WalkInRequest,
};
use tracing::debug;

/// Which list the dashboard is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueView {
    /// Entries that have not reached a terminal status. Filtered server-side.
    Active,
    /// Every entry checked in today, terminal ones included.
    Today,
}

impl QueueView {
    pub fn path(self) -> &'static str {
        match self {
            QueueView::Active => "/active",
            QueueView::Today => "/today",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QueueView::Active => "Aktif Sıra",
            QueueView::Today => "Bugün",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            QueueView::Active => QueueView::Today,
            QueueView::Today => QueueView::Active,
        }
    }
}

/// Data provider behind the store and the controller.
///
/// The HTTP client and the demo fixtures both implement it, so the
/// production path never carries inline fallback data.
#[async_trait]
pub trait QueueSource: Send + Sync {
    async fn list(&self, view: QueueView) -> Result<Vec<QueueEntry>, ClinicError>;

    async fn check_in_appointment(&self, appointment_id: i64) -> Result<QueueEntry, ClinicError>;

    async fn check_in_walk_in(&self, request: &WalkInRequest) -> Result<QueueEntry, ClinicError>;

    async fn update_status(&self, id: i64, status: QueueStatus) -> Result<QueueEntry, ClinicError>;

    async fn assign(&self, id: i64, request: &AssignRequest) -> Result<QueueEntry, ClinicError>;

    async fn wait_time(&self, id: i64) -> Result<WaitTime, ClinicError>;

    /// Short description for the header and the logs.
    fn describe(&self) -> String;
}

pub struct QueueApi {
    transport: HttpTransport,
}

impl QueueApi {
    pub fn new(config: &svckit::ApiConfig, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            transport: HttpTransport::new(config, credentials),
        }
    }

    pub async fn check_in_appointment(&self, appointment_id: i64) -> ApiResponse<QueueEntry> {
        self.transport
            .post_empty(&format!("/check-in/appointment/{}", appointment_id))
            .await
    }

    pub async fn check_in_walk_in(&self, request: &WalkInRequest) -> ApiResponse<QueueEntry> {
        self.transport.post("/check-in/walk-in", request).await
    }

    pub async fn active(&self) -> ApiResponse<Vec<QueueEntry>> {
        self.transport
            .get(QueueView::Active.path(), RequestOptions::no_cache())
            .await
    }

    pub async fn today(&self) -> ApiResponse<Vec<QueueEntry>> {
        self.transport
            .get(QueueView::Today.path(), RequestOptions::no_cache())
            .await
    }

    pub async fn update_status(&self, id: i64, status: QueueStatus) -> ApiResponse<QueueEntry> {
        self.transport
            .put(&format!("/{}/status", id), &StatusUpdateRequest { status })
            .await
    }

    pub async fn assign(&self, id: i64, request: &AssignRequest) -> ApiResponse<QueueEntry> {
        self.transport.put(&format!("/{}/assign", id), request).await
    }

    pub async fn wait_time(&self, id: i64) -> ApiResponse<WaitTime> {
        self.transport
            .get(&format!("/{}/wait-time", id), RequestOptions::no_cache())
            .await
    }
}

#[async_trait]
impl QueueSource for QueueApi {
    async fn list(&self, view: QueueView) -> Result<Vec<QueueEntry>, ClinicError> {
        let response = match view {
            QueueView::Active => self.active().await,
            QueueView::Today => self.today().await,
        };
        debug!("Fetched {:?} queue: success={}", view, response.success);
        response.into_result()
    }

    async fn check_in_appointment(&self, appointment_id: i64) -> Result<QueueEntry, ClinicError> {
        QueueApi::check_in_appointment(self, appointment_id)
            .await
            .into_result()
    }

    async fn check_in_walk_in(&self, request: &WalkInRequest) -> Result<QueueEntry, ClinicError> {
        QueueApi::check_in_walk_in(self, request).await.into_result()
    }

    async fn update_status(&self, id: i64, status: QueueStatus) -> Result<QueueEntry, ClinicError> {
        QueueApi::update_status(self, id, status).await.into_result()
    }

    async fn assign(&self, id: i64, request: &AssignRequest) -> Result<QueueEntry, ClinicError> {
        QueueApi::assign(self, id, request).await.into_result()
    }

    async fn wait_time(&self, id: i64) -> Result<WaitTime, ClinicError> {
        QueueApi::wait_time(self, id).await.into_result()
    }

    fn describe(&self) -> String {
        self.transport.base_url().to_string()
    }
}
