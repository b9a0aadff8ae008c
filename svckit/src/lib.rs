pub mod config;
pub mod credentials;
pub mod errors;
pub mod metrics;
pub mod transport;
pub mod types;

pub use config::{ApiConfig, AuthConfig, ObservabilityConfig, PollConfig};
pub use credentials::{Anonymous, CredentialSource, StaticToken, TokenFile};
pub use errors::ClinicError;
pub use transport::{ApiResponse, HttpTransport, Method, RequestOptions};
pub use types::{
    AppointmentType, AssignRequest, Priority, QueueEntry, QueueStatus, Room, StatusUpdateRequest,
    WaitTime, WalkInRequest,
};
