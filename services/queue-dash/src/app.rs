// services/queue-dash/src/app.rs
//
// Queue Dashboard - application state and key handling
//
// Mutations run as tasks on the runtime; their outcomes come back over a
// channel as notices and land in the activity log on the next frame.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Local};
use crossterm::event::KeyCode;
use svckit::{ClinicError, QueueEntry};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::actions::QueueController;
use crate::forms::{AssignForm, DigitField, WalkInForm};
use crate::store::{QueueRow, QueueSnapshot};
use crate::view::{format_wait, row_actions, status_label, QueueAction};

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

/// Result of a background operation, delivered to the UI thread.
#[derive(Debug)]
pub enum Notice {
    Info(String),
    Failed(String),
    CheckedIn(QueueEntry),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    Assign {
        entry_id: i64,
        queue_number: u32,
        veterinarian: DigitField,
        form: AssignForm,
    },
    WalkIn {
        animal: DigitField,
        form: WalkInForm,
    },
    AppointmentCheckIn {
        appointment: DigitField,
    },
    Receipt(QueueEntry),
}

pub struct App {
    controller: Arc<QueueController>,
    runtime: Handle,
    notices_tx: UnboundedSender<Notice>,
    notices_rx: UnboundedReceiver<Notice>,
    pub demo: bool,
    pub mode: Mode,
    pub selected: usize,
    pub activity_log: Vec<LogEntry>,
    pub should_quit: bool,
}

impl App {
    pub fn new(controller: Arc<QueueController>, runtime: Handle, demo: bool) -> Self {
        let (notices_tx, notices_rx) = unbounded_channel();
        Self {
            controller,
            runtime,
            notices_tx,
            notices_rx,
            demo,
            mode: Mode::Browse,
            selected: 0,
            activity_log: Vec::new(),
            should_quit: false,
        }
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        self.controller.store().snapshot()
    }

    pub fn source_description(&self) -> String {
        self.controller.describe_source()
    }

    pub fn add_log(&mut self, level: LogLevel, message: &str) {
        self.activity_log.push(LogEntry {
            timestamp: Local::now(),
            level,
            message: message.to_string(),
        });

        if self.activity_log.len() > MAX_LOG_ENTRIES {
            self.activity_log.remove(0);
        }
    }

    /// Applies notices that arrived since the last frame.
    pub fn drain_notices(&mut self) {
        while let Ok(notice) = self.notices_rx.try_recv() {
            match notice {
                Notice::Info(message) => self.add_log(LogLevel::Info, &message),
                Notice::Failed(message) => self.add_log(LogLevel::Error, &message),
                Notice::CheckedIn(entry) => {
                    self.add_log(
                        LogLevel::Info,
                        &format!("{} sıraya alındı: #{}", entry.animal_name, entry.queue_number),
                    );
                    // An open form keeps focus; the log line is the receipt then.
                    if self.mode == Mode::Browse {
                        self.mode = Mode::Receipt(entry);
                    }
                }
            }
        }
        let rows = self.controller.store().snapshot().rows.len();
        self.clamp_selection(rows);
    }

    /// Keeps the selection on a real row after the list shrinks.
    fn clamp_selection(&mut self, rows: usize) {
        self.selected = self.selected.min(rows.saturating_sub(1));
    }

    pub fn selected_row<'a>(&self, snapshot: &'a QueueSnapshot) -> Option<&'a QueueRow> {
        snapshot.rows.get(self.selected)
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        let mode = std::mem::replace(&mut self.mode, Mode::Browse);
        self.mode = match mode {
            Mode::Browse => {
                self.handle_browse_key(code);
                // A browse key may have opened a form.
                return;
            }
            Mode::Receipt(_) => Mode::Browse,
            Mode::Assign {
                entry_id,
                queue_number,
                mut veterinarian,
                mut form,
            } => match code {
                KeyCode::Esc => Mode::Browse,
                KeyCode::Enter if form.can_submit() => {
                    self.submit_assign(entry_id, form);
                    Mode::Browse
                }
                KeyCode::Enter => {
                    self.add_log(LogLevel::Warn, "Lütfen bir veteriner seçin");
                    Mode::Assign {
                        entry_id,
                        queue_number,
                        veterinarian,
                        form,
                    }
                }
                other => {
                    match other {
                        KeyCode::Tab => form.cycle_room(),
                        KeyCode::Backspace => veterinarian.pop(),
                        KeyCode::Char(c) => veterinarian.push(c),
                        _ => {}
                    }
                    form.veterinarian_id = veterinarian.value();
                    Mode::Assign {
                        entry_id,
                        queue_number,
                        veterinarian,
                        form,
                    }
                }
            },
            Mode::WalkIn {
                mut animal,
                mut form,
            } => match code {
                KeyCode::Esc => Mode::Browse,
                KeyCode::Enter => match form.validate() {
                    Ok(_) => {
                        self.submit_walk_in(form);
                        Mode::Browse
                    }
                    Err(e) => {
                        self.add_log(LogLevel::Warn, &validation_text(&e));
                        Mode::WalkIn { animal, form }
                    }
                },
                other => {
                    match other {
                        KeyCode::Tab => form.cycle_appointment_type(),
                        KeyCode::BackTab => form.cycle_priority(),
                        KeyCode::Backspace => animal.pop(),
                        KeyCode::Char(c) => animal.push(c),
                        _ => {}
                    }
                    form.animal_id = animal.value();
                    Mode::WalkIn { animal, form }
                }
            },
            Mode::AppointmentCheckIn { mut appointment } => match code {
                KeyCode::Esc => Mode::Browse,
                KeyCode::Enter => match appointment.value() {
                    Some(appointment_id) => {
                        self.submit_appointment(appointment_id);
                        Mode::Browse
                    }
                    None => {
                        self.add_log(LogLevel::Warn, "Lütfen bir randevu numarası girin");
                        Mode::AppointmentCheckIn { appointment }
                    }
                },
                KeyCode::Backspace => {
                    appointment.pop();
                    Mode::AppointmentCheckIn { appointment }
                }
                KeyCode::Char(c) => {
                    appointment.push(c);
                    Mode::AppointmentCheckIn { appointment }
                }
                _ => Mode::AppointmentCheckIn { appointment },
            },
        };
    }

    fn handle_browse_key(&mut self, code: KeyCode) {
        let snapshot = self.snapshot();
        self.clamp_selection(snapshot.rows.len());
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < snapshot.rows.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('r') => self.request_refresh(),
            KeyCode::Char('t') => {
                let store = self.controller.store().clone();
                let view = store.view().toggled();
                store.set_view(view);
                self.selected = 0;
                self.add_log(LogLevel::Info, &format!("Görünüm: {}", view.label()));
                self.request_refresh();
            }
            KeyCode::Char('w') => {
                self.mode = Mode::WalkIn {
                    animal: DigitField::default(),
                    form: WalkInForm::default(),
                }
            }
            KeyCode::Char('i') => {
                self.mode = Mode::AppointmentCheckIn {
                    appointment: DigitField::default(),
                }
            }
            KeyCode::Char('e') => {
                if let Some(row) = self.selected_row(&snapshot) {
                    let (id, number) = (row.entry.id, row.entry.queue_number);
                    let controller = self.controller.clone();
                    self.spawn(async move {
                        controller.wait_time(id).await.map(|wait| {
                            Notice::Info(format!(
                                "#{} tahmini bekleme: {}",
                                number,
                                format_wait(wait.estimated_wait_minutes)
                            ))
                        })
                    });
                }
            }
            KeyCode::Char(c) => {
                let Some(row) = self.selected_row(&snapshot) else {
                    return;
                };
                let Some(action) = row_actions(row).iter().copied().find(|a| a.key() == c) else {
                    if ['a', 's', 'c'].contains(&c) {
                        let reason = if row.pending {
                            "işlem bekleniyor".to_string()
                        } else {
                            status_label(row.entry.status).to_lowercase()
                        };
                        self.add_log(
                            LogLevel::Warn,
                            &format!("#{} için işlem yok ({})", row.entry.queue_number, reason),
                        );
                    }
                    return;
                };
                let entry = row.entry.clone();
                self.dispatch(action, &entry);
            }
            _ => {}
        }
    }

    fn dispatch(&mut self, action: QueueAction, entry: &QueueEntry) {
        match action {
            QueueAction::Assign => {
                self.mode = Mode::Assign {
                    entry_id: entry.id,
                    queue_number: entry.queue_number,
                    veterinarian: DigitField::default(),
                    form: AssignForm::default(),
                }
            }
            QueueAction::Start => {
                let (id, number) = (entry.id, entry.queue_number);
                let controller = self.controller.clone();
                self.spawn(async move {
                    controller
                        .start(id)
                        .await
                        .map(|_| Notice::Info(format!("#{} muayeneye alındı", number)))
                });
            }
            QueueAction::Complete => {
                let (id, number) = (entry.id, entry.queue_number);
                let controller = self.controller.clone();
                self.spawn(async move {
                    controller
                        .complete(id)
                        .await
                        .map(|_| Notice::Info(format!("#{} tamamlandı", number)))
                });
            }
        }
    }

    fn submit_assign(&mut self, entry_id: i64, form: AssignForm) {
        let controller = self.controller.clone();
        self.spawn(async move {
            controller.assign(entry_id, &form).await.map(|entry| {
                Notice::Info(format!(
                    "#{} atandı: {}",
                    entry.queue_number,
                    crate::view::assignment_text(&entry)
                ))
            })
        });
    }

    fn submit_walk_in(&mut self, form: WalkInForm) {
        let controller = self.controller.clone();
        self.spawn(async move { controller.check_in_walk_in(&form).await.map(Notice::CheckedIn) });
    }

    fn submit_appointment(&mut self, appointment_id: i64) {
        let controller = self.controller.clone();
        self.spawn(async move {
            controller
                .check_in_appointment(appointment_id)
                .await
                .map(Notice::CheckedIn)
        });
    }

    pub fn request_refresh(&mut self) {
        let store = self.controller.store().clone();
        self.runtime.spawn(async move {
            store.refresh().await;
        });
    }

    fn spawn<F>(&self, operation: F)
    where
        F: Future<Output = Result<Notice, ClinicError>> + Send + 'static,
    {
        let notices = self.notices_tx.clone();
        self.runtime.spawn(async move {
            let notice = match operation.await {
                Ok(notice) => notice,
                Err(e) => Notice::Failed(e.to_string()),
            };
            // The receiver only goes away when the app is shutting down.
            let _ = notices.send(notice);
        });
    }
}

fn validation_text(err: &ClinicError) -> String {
    match err {
        ClinicError::Validation(message) => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::QueueView;
    use crate::poller::Poller;
    use crate::store::{LoadPhase, QueueStore};
    use crate::testing::{fake_api, FakeServer, ScriptedSource};
    use crate::view::QueueSummary;
    use std::time::Duration;
    use svckit::QueueStatus;

    async fn wait_for<F: Fn() -> bool>(condition: F) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached in time");
    }

    fn scripted_app(source: &Arc<ScriptedSource>) -> App {
        let store = Arc::new(QueueStore::new(source.clone(), QueueView::Active));
        let controller = Arc::new(QueueController::new(source.clone(), store));
        App::new(controller, Handle::current(), false)
    }

    #[tokio::test]
    async fn test_mount_shows_summary_of_first_fetch() {
        let server = FakeServer::start().await;
        let source: Arc<dyn crate::api::QueueSource> = Arc::new(fake_api(&server));
        let store = Arc::new(QueueStore::new(source.clone(), QueueView::Active));
        let controller = Arc::new(QueueController::new(source, store.clone()));
        let app = App::new(controller, Handle::current(), false);

        let _poller = Poller::start(store.clone(), Some(Duration::from_secs(30)));
        wait_for(|| store.snapshot().phase == LoadPhase::Loaded).await;

        let summary = QueueSummary::from_rows(&app.snapshot().rows);
        assert_eq!(summary.waiting, 2);
        assert_eq!(summary.in_progress, 1);
        assert_eq!(summary.total, 3);
    }

    #[tokio::test]
    async fn test_walk_in_enter_without_patient_stays_in_form() {
        let source = ScriptedSource::new();
        let mut app = scripted_app(&source);

        app.handle_key(KeyCode::Char('w'));
        app.handle_key(KeyCode::Enter);

        assert!(matches!(app.mode, Mode::WalkIn { .. }));
        assert_eq!(app.activity_log.last().unwrap().level, LogLevel::Warn);
        tokio::task::yield_now().await;
        assert_eq!(source.mutation_calls(), 0);
    }

    #[tokio::test]
    async fn test_walk_in_submit_shows_receipt() {
        let source = ScriptedSource::new();
        let mut app = scripted_app(&source);

        app.handle_key(KeyCode::Char('w'));
        app.handle_key(KeyCode::Char('4'));
        app.handle_key(KeyCode::Char('7'));
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.mode, Mode::Browse);

        wait_for(|| source.list_calls() == 1).await;
        for _ in 0..50 {
            app.drain_notices();
            if matches!(app.mode, Mode::Receipt(_)) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        match &app.mode {
            Mode::Receipt(entry) => assert_eq!(entry.animal_id, 47),
            other => panic!("expected receipt, got {:?}", other),
        }
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.mode, Mode::Browse);
    }

    #[tokio::test]
    async fn test_assign_form_needs_veterinarian() {
        let source = ScriptedSource::new();
        source.push_list(Ok(vec![crate::testing::entry(1, QueueStatus::Waiting)]));
        let mut app = scripted_app(&source);
        app.controller.store().refresh().await;

        app.handle_key(KeyCode::Char('a'));
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Enter);
        match &app.mode {
            Mode::Assign { form, .. } => {
                assert!(!form.can_submit());
                assert_eq!(form.room, Some(svckit::Room::Exam1));
            }
            other => panic!("expected assign form, got {:?}", other),
        }

        app.handle_key(KeyCode::Char('5'));
        app.handle_key(KeyCode::Enter);
        assert_eq!(app.mode, Mode::Browse);

        wait_for(|| source.mutation_calls() == 1).await;
    }

    #[tokio::test]
    async fn test_in_progress_row_cannot_be_started() {
        let source = ScriptedSource::new();
        source.push_list(Ok(vec![crate::testing::entry(3, QueueStatus::InProgress)]));
        let mut app = scripted_app(&source);
        app.controller.store().refresh().await;

        app.handle_key(KeyCode::Char('s'));
        app.handle_key(KeyCode::Char('a'));

        assert_eq!(app.mode, Mode::Browse);
        assert_eq!(app.activity_log.len(), 2);
        tokio::task::yield_now().await;
        assert_eq!(source.mutation_calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_mutation_is_logged_as_error() {
        let source = ScriptedSource::new();
        source.push_list(Ok(vec![crate::testing::entry(1, QueueStatus::Waiting)]));
        source.fail_mutations(ClinicError::Server {
            status: 409,
            message: "Geçersiz durum geçişi".to_string(),
        });
        let mut app = scripted_app(&source);
        app.controller.store().refresh().await;

        app.handle_key(KeyCode::Char('s'));
        for _ in 0..50 {
            app.drain_notices();
            if !app.activity_log.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let last = app.activity_log.last().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert!(last.message.contains("Geçersiz durum geçişi"));
    }

    #[tokio::test]
    async fn test_wait_estimate_is_logged() {
        let source = ScriptedSource::new();
        source.push_list(Ok(vec![crate::testing::entry(2, QueueStatus::Waiting)]));
        let mut app = scripted_app(&source);
        app.controller.store().refresh().await;

        app.handle_key(KeyCode::Char('e'));
        for _ in 0..50 {
            app.drain_notices();
            if !app.activity_log.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(app.activity_log[0].message, "#2 tahmini bekleme: 15dk");
    }

    #[tokio::test]
    async fn test_selection_follows_shrinking_list() {
        let source = ScriptedSource::new();
        source.push_list(Ok(vec![
            crate::testing::entry(1, QueueStatus::Waiting),
            crate::testing::entry(2, QueueStatus::InProgress),
            crate::testing::entry(3, QueueStatus::InProgress),
        ]));
        source.push_list(Ok(vec![
            crate::testing::entry(1, QueueStatus::Waiting),
            crate::testing::entry(2, QueueStatus::InProgress),
        ]));
        let mut app = scripted_app(&source);
        app.controller.store().refresh().await;

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        assert_eq!(app.selected, 2);

        app.controller.store().refresh().await;
        app.handle_key(KeyCode::Char('c'));

        assert_eq!(app.selected, 1);
        wait_for(|| source.mutation_calls() == 1).await;
    }

    #[tokio::test]
    async fn test_selection_is_clamped_each_frame() {
        let source = ScriptedSource::new();
        source.push_list(Ok(vec![
            crate::testing::entry(1, QueueStatus::Waiting),
            crate::testing::entry(2, QueueStatus::Waiting),
        ]));
        let mut app = scripted_app(&source);
        app.controller.store().refresh().await;
        app.selected = 1;

        app.controller.store().refresh().await;
        app.drain_notices();

        assert_eq!(app.selected, 0);
    }

    #[tokio::test]
    async fn test_check_in_does_not_replace_open_form() {
        let source = ScriptedSource::new();
        let mut app = scripted_app(&source);

        app.handle_key(KeyCode::Char('w'));
        app.handle_key(KeyCode::Char('4'));
        app.notices_tx
            .send(Notice::CheckedIn(crate::testing::entry(9, QueueStatus::Waiting)))
            .unwrap();
        app.drain_notices();

        match &app.mode {
            Mode::WalkIn { animal, .. } => assert_eq!(animal.text(), "4"),
            other => panic!("expected walk-in form, got {:?}", other),
        }
        assert!(app.activity_log.last().unwrap().message.contains("#9"));
    }

    #[tokio::test]
    async fn test_toggle_view_resets_selection() {
        let source = ScriptedSource::new();
        let mut app = scripted_app(&source);
        app.selected = 3;

        app.handle_key(KeyCode::Char('t'));

        assert_eq!(app.selected, 0);
        assert_eq!(app.snapshot().view, QueueView::Today);
    }

    #[test]
    fn test_log_is_bounded() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let source = ScriptedSource::new();
        let store = Arc::new(QueueStore::new(source.clone(), QueueView::Active));
        let controller = Arc::new(QueueController::new(source, store));
        let mut app = App::new(controller, runtime.handle().clone(), true);

        for i in 0..150 {
            app.add_log(LogLevel::Info, &format!("line {}", i));
        }

        assert_eq!(app.activity_log.len(), MAX_LOG_ENTRIES);
        assert_eq!(app.activity_log[0].message, "line 50");
    }
}
