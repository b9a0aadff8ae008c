// services/queue-dash/src/lib.rs
//
// Queue Dashboard - Library exports
//

pub mod actions;
pub mod api;
pub mod app;
pub mod config;
pub mod forms;
pub mod mock;
pub mod poller;
pub mod store;
pub mod ui;
pub mod view;

#[cfg(test)]
mod testing;

pub use actions::QueueController;
pub use api::{QueueApi, QueueSource, QueueView};
pub use mock::MockQueue;
pub use poller::Poller;
pub use store::{LoadPhase, PendingChange, QueueRow, QueueSnapshot, QueueStore, RefreshOutcome};
