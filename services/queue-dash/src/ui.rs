// services/queue-dash/src/ui.rs
//
// Queue Dashboard - frame rendering

use ratatui::{prelude::*, widgets::*};

use crate::app::{App, LogLevel, Mode};
use crate::forms::{AssignForm, DigitField, WalkInForm};
use crate::store::{LoadPhase, QueueSnapshot};
use crate::view::{
    appointment_type_label, assignment_text, priority_label, priority_tone, row_actions,
    status_label, status_tone, wait_text, QueueSummary, Tone,
};

// Clinic palette: teal, white, slate, amber
mod colors {
    use ratatui::style::Color;

    pub const TEAL: Color = Color::Rgb(42, 161, 152);
    pub const DARK_TEAL: Color = Color::Rgb(0, 95, 95);
    pub const WHITE: Color = Color::Rgb(253, 246, 227);
    pub const SLATE: Color = Color::Rgb(147, 161, 161);
    pub const AMBER: Color = Color::Rgb(255, 193, 37);
    pub const BLUE: Color = Color::Rgb(38, 139, 210);
    pub const BG_DARK: Color = Color::Rgb(0, 20, 30);
    pub const BG_PANEL: Color = Color::Rgb(7, 30, 41);
    pub const SUCCESS: Color = Color::Rgb(133, 153, 0);
    pub const ERROR: Color = Color::Rgb(220, 50, 47);
}

fn tone_color(tone: Tone) -> Color {
    match tone {
        Tone::Muted => colors::SLATE,
        Tone::Info => colors::BLUE,
        Tone::Success => colors::SUCCESS,
        Tone::Warning => colors::AMBER,
        Tone::Danger => colors::ERROR,
    }
}

pub fn draw_ui(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let snapshot = app.snapshot();

    frame.render_widget(
        Block::default().style(Style::default().bg(colors::BG_DARK)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(5), // Summary cards
            Constraint::Min(10),   // Queue + activity
            Constraint::Length(3), // Footer
        ])
        .split(area);

    draw_header(frame, chunks[0], app, &snapshot);
    draw_summary(frame, chunks[1], &snapshot);
    draw_main_content(frame, chunks[2], app, &snapshot);
    draw_footer(frame, chunks[3]);

    match &app.mode {
        Mode::Browse => {}
        Mode::Assign {
            queue_number,
            veterinarian,
            form,
            ..
        } => draw_assign_form(frame, area, *queue_number, veterinarian, form),
        Mode::WalkIn { animal, form } => draw_walk_in_form(frame, area, animal, form),
        Mode::AppointmentCheckIn { appointment } => draw_appointment_form(frame, area, appointment),
        Mode::Receipt(entry) => draw_popup(
            frame,
            area,
            " SIRA FİŞİ ",
            vec![
                Line::from(Span::styled(
                    format!("#{}", entry.queue_number),
                    Style::default().fg(colors::AMBER).bold(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("{} ({})", entry.animal_name, entry.owner_name),
                    Style::default().fg(colors::WHITE),
                )),
                Line::from(Span::styled(
                    format!("Tahmini bekleme: {}", wait_text(entry)),
                    Style::default().fg(colors::SLATE),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Kapatmak için bir tuşa basın",
                    Style::default().fg(colors::SLATE).add_modifier(Modifier::DIM),
                )),
            ],
        ),
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App, snapshot: &QueueSnapshot) {
    let (mode_text, mode_color) = if app.demo {
        ("DEMO", colors::AMBER)
    } else if snapshot.phase == LoadPhase::Error {
        ("DISCONNECTED", colors::ERROR)
    } else {
        ("LIVE", colors::SUCCESS)
    };

    let updated = match (snapshot.phase, snapshot.last_updated) {
        (LoadPhase::Loading, _) => "yükleniyor...".to_string(),
        (_, Some(at)) => format!("son güncelleme {}", at.format("%H:%M:%S")),
        (_, None) => "henüz güncellenmedi".to_string(),
    };

    let title = Line::from(vec![
        Span::styled(
            " VET KLİNİK ",
            Style::default().fg(colors::WHITE).bg(colors::DARK_TEAL).bold(),
        ),
        Span::raw("  "),
        Span::styled("HASTA SIRASI", Style::default().fg(colors::TEAL).bold()),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", mode_text),
            Style::default().fg(mode_color).bold(),
        ),
        Span::raw("  "),
        Span::styled(
            snapshot.view.label(),
            Style::default().fg(colors::WHITE).bold(),
        ),
        Span::raw("  "),
        Span::styled(updated, Style::default().fg(colors::SLATE)),
    ]);

    let header = Paragraph::new(title)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Style::default().fg(colors::DARK_TEAL))
                .style(Style::default().bg(colors::BG_DARK)),
        );

    frame.render_widget(header, area);
}

fn draw_summary(frame: &mut Frame, area: Rect, snapshot: &QueueSnapshot) {
    let summary = QueueSummary::from_rows(&snapshot.rows);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    draw_stat_box(frame, chunks[0], "BEKLEYEN", summary.waiting, colors::AMBER);
    draw_stat_box(frame, chunks[1], "MUAYENEDE", summary.in_progress, colors::BLUE);
    draw_stat_box(frame, chunks[2], "TAMAMLANAN", summary.completed, colors::SUCCESS);
    draw_stat_box(frame, chunks[3], "TOPLAM", summary.total, colors::WHITE);
}

fn draw_stat_box(frame: &mut Frame, area: Rect, label: &str, value: usize, value_color: Color) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SLATE))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::from(Span::styled(
            label,
            Style::default().fg(colors::SLATE).add_modifier(Modifier::DIM),
        )),
        Line::from(Span::styled(
            value.to_string(),
            Style::default().fg(value_color).bold(),
        )),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

fn draw_main_content(frame: &mut Frame, area: Rect, app: &App, snapshot: &QueueSnapshot) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    draw_queue_table(frame, chunks[0], app, snapshot);
    draw_activity_panel(frame, chunks[1], app);
}

fn draw_queue_table(frame: &mut Frame, area: Rect, app: &App, snapshot: &QueueSnapshot) {
    let title = match &snapshot.error {
        Some(error) => Span::styled(
            format!(" SIRA - {} ", error),
            Style::default().fg(colors::ERROR).bold(),
        ),
        None => Span::styled(" SIRA ", Style::default().fg(colors::WHITE).bold()),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SLATE))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    if snapshot.rows.is_empty() {
        let message = match snapshot.phase {
            LoadPhase::Idle | LoadPhase::Loading => "Yükleniyor...",
            LoadPhase::Error => "Sıra alınamadı. [R] ile tekrar deneyin.",
            LoadPhase::Loaded => "Sırada hasta yok",
        };
        let empty = Paragraph::new(Span::styled(message, Style::default().fg(colors::SLATE)))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let rows: Vec<Row> = snapshot
        .rows
        .iter()
        .map(|row| {
            let entry = &row.entry;
            let actions: String = row_actions(row)
                .iter()
                .map(|a| format!("[{}]{} ", a.key().to_ascii_uppercase(), a.label()))
                .collect();
            let kind = entry
                .appointment_type
                .map(appointment_type_label)
                .unwrap_or("-");

            Row::new(vec![
                Cell::from(Span::styled(
                    format!("#{}", entry.queue_number),
                    Style::default().fg(colors::AMBER).bold(),
                )),
                Cell::from(Span::styled(&entry.animal_name, Style::default().fg(colors::WHITE))),
                Cell::from(Span::styled(&entry.owner_name, Style::default().fg(colors::SLATE))),
                Cell::from(Span::styled(kind, Style::default().fg(colors::SLATE))),
                Cell::from(Span::styled(
                    status_label(entry.status),
                    Style::default().fg(tone_color(status_tone(entry.status))),
                )),
                Cell::from(Span::styled(
                    priority_label(entry.priority),
                    Style::default().fg(tone_color(priority_tone(entry.priority))),
                )),
                Cell::from(Span::styled(wait_text(entry), Style::default().fg(colors::WHITE))),
                Cell::from(Span::styled(
                    assignment_text(entry),
                    Style::default().fg(colors::SLATE),
                )),
                Cell::from(if row.pending {
                    Span::styled(
                        "bekleniyor…",
                        Style::default().fg(colors::AMBER).add_modifier(Modifier::ITALIC),
                    )
                } else {
                    Span::styled(actions, Style::default().fg(colors::TEAL))
                }),
            ])
        })
        .collect();

    let header_style = Style::default().fg(colors::TEAL).bold();
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(10),
            Constraint::Min(10),
            Constraint::Length(9),
            Constraint::Length(11),
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Min(14),
            Constraint::Length(20),
        ],
    )
    .header(
        Row::new(vec![
            Cell::from(Span::styled("NO", header_style)),
            Cell::from(Span::styled("HASTA", header_style)),
            Cell::from(Span::styled("SAHİBİ", header_style)),
            Cell::from(Span::styled("TÜR", header_style)),
            Cell::from(Span::styled("DURUM", header_style)),
            Cell::from(Span::styled("ÖNCELİK", header_style)),
            Cell::from(Span::styled("BEKLEME", header_style)),
            Cell::from(Span::styled("VETERİNER / ODA", header_style)),
            Cell::from(Span::styled("İŞLEM", header_style)),
        ])
        .bottom_margin(1),
    )
    .block(block)
    .row_highlight_style(Style::default().bg(colors::DARK_TEAL))
    .highlight_symbol("▶ ");

    let mut state = TableState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn draw_activity_panel(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(Span::styled(
            " İŞLEM GÜNLÜĞÜ ",
            Style::default().fg(colors::WHITE).bold(),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::SLATE))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    let logs: Vec<Line> = app
        .activity_log
        .iter()
        .rev()
        .take(20)
        .map(|entry| {
            let (prefix, color) = match entry.level {
                LogLevel::Error => ("[ERR]", colors::ERROR),
                LogLevel::Warn => ("[WRN]", colors::AMBER),
                LogLevel::Info => ("[INF]", colors::SUCCESS),
            };

            Line::from(vec![
                Span::styled(
                    format!("{} ", entry.timestamp.format("%H:%M:%S")),
                    Style::default().fg(colors::SLATE).add_modifier(Modifier::DIM),
                ),
                Span::styled(format!("{} ", prefix), Style::default().fg(color)),
                Span::styled(&entry.message, Style::default().fg(colors::WHITE)),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(logs).block(block).wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    let key = |k: &'static str, bg: Color| {
        Span::styled(k, Style::default().fg(colors::BG_DARK).bg(bg))
    };
    let label = |l: &'static str| Span::styled(l, Style::default().fg(colors::SLATE));
    let (ok, failed) = svckit::metrics::request_totals();

    let help = Line::from(vec![
        key(" [Q] ", colors::ERROR),
        label(" Çıkış "),
        key(" [R] ", colors::WHITE),
        label(" Yenile "),
        key(" [T] ", colors::TEAL),
        label(" Görünüm "),
        key(" [S/C/A] ", colors::AMBER),
        label(" Başlat/Tamamla/Ata "),
        key(" [E] ", colors::SLATE),
        label(" Bekleme "),
        key(" [W/I] ", colors::BLUE),
        label(" Kayıt "),
        Span::raw("   "),
        Span::styled(
            format!("istek {} ok / {} hata", ok, failed),
            Style::default()
                .fg(if failed > 0 { colors::ERROR } else { colors::SLATE })
                .add_modifier(Modifier::DIM),
        ),
    ]);

    let footer = Paragraph::new(help)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors::DARK_TEAL))
                .style(Style::default().bg(colors::BG_DARK)),
        );

    frame.render_widget(footer, area);
}

fn field_line(label: &'static str, value: String, hint: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<14}", label), Style::default().fg(colors::SLATE)),
        Span::styled(value, Style::default().fg(colors::WHITE).bold()),
        Span::styled(
            format!("  {}", hint),
            Style::default().fg(colors::SLATE).add_modifier(Modifier::DIM),
        ),
    ])
}

fn digits_or_cursor(field: &DigitField) -> String {
    format!("{}_", field.text())
}

fn draw_assign_form(
    frame: &mut Frame,
    area: Rect,
    queue_number: u32,
    veterinarian: &DigitField,
    form: &AssignForm,
) {
    let submit_style = if form.can_submit() {
        Style::default().fg(colors::BG_DARK).bg(colors::SUCCESS)
    } else {
        Style::default().fg(colors::SLATE).add_modifier(Modifier::DIM)
    };
    let room = form.room.map(|r| r.label()).unwrap_or("-");

    draw_popup(
        frame,
        area,
        " VETERİNER ATA ",
        vec![
            Line::from(Span::styled(
                format!("Sıra #{}", queue_number),
                Style::default().fg(colors::AMBER).bold(),
            )),
            Line::from(""),
            field_line("Veteriner no", digits_or_cursor(veterinarian), "rakam"),
            field_line("Oda", room.to_string(), "[Tab]"),
            Line::from(""),
            Line::from(vec![
                Span::styled(" [Enter] Ata ", submit_style),
                Span::raw("  "),
                Span::styled("[Esc] Vazgeç", Style::default().fg(colors::SLATE)),
            ]),
        ],
    );
}

fn draw_walk_in_form(frame: &mut Frame, area: Rect, animal: &DigitField, form: &WalkInForm) {
    draw_popup(
        frame,
        area,
        " RANDEVUSUZ KAYIT ",
        vec![
            field_line("Hasta no", digits_or_cursor(animal), "rakam"),
            field_line(
                "Tür",
                appointment_type_label(form.appointment_type).to_string(),
                "[Tab]",
            ),
            field_line(
                "Öncelik",
                priority_label(form.priority).to_string(),
                "[Shift+Tab]",
            ),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    " [Enter] Kaydet ",
                    Style::default().fg(colors::BG_DARK).bg(colors::SUCCESS),
                ),
                Span::raw("  "),
                Span::styled("[Esc] Vazgeç", Style::default().fg(colors::SLATE)),
            ]),
        ],
    );
}

fn draw_appointment_form(frame: &mut Frame, area: Rect, appointment: &DigitField) {
    draw_popup(
        frame,
        area,
        " RANDEVU KABUL ",
        vec![
            field_line("Randevu no", digits_or_cursor(appointment), "rakam"),
            Line::from(""),
            Line::from(vec![
                Span::styled(
                    " [Enter] Kabul ",
                    Style::default().fg(colors::BG_DARK).bg(colors::SUCCESS),
                ),
                Span::raw("  "),
                Span::styled("[Esc] Vazgeç", Style::default().fg(colors::SLATE)),
            ]),
        ],
    );
}

fn draw_popup(frame: &mut Frame, area: Rect, title: &'static str, lines: Vec<Line>) {
    let popup = centered_rect(50, lines.len() as u16 + 4, area);
    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(colors::WHITE).bold()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(colors::TEAL))
        .border_type(BorderType::Rounded)
        .style(Style::default().bg(colors::BG_PANEL));

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(block.padding(Padding::uniform(1))),
        popup,
    );
}

/// A rectangle `percent_x` wide and `height` rows tall, centred in `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::QueueController;
    use crate::api::QueueView;
    use crate::store::QueueStore;
    use crate::testing::{entry, ScriptedSource};
    use ratatui::backend::TestBackend;
    use std::sync::Arc;
    use svckit::QueueStatus;

    fn rendered_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_renders_rows_and_summary() {
        let source = ScriptedSource::new();
        source.push_list(Ok(vec![
            entry(1, QueueStatus::Waiting),
            entry(3, QueueStatus::InProgress),
        ]));
        let store = Arc::new(QueueStore::new(source.clone(), QueueView::Active));
        store.refresh().await;
        let controller = Arc::new(QueueController::new(source, store));
        let app = App::new(controller, tokio::runtime::Handle::current(), true);

        let mut terminal = Terminal::new(TestBackend::new(200, 40)).unwrap();
        terminal.draw(|frame| draw_ui(frame, &app)).unwrap();
        let text = rendered_text(&terminal);

        assert!(text.contains("[DEMO]"));
        assert!(text.contains("Aktif Sıra"));
        assert!(text.contains("Bekliyor"));
        assert!(text.contains("Muayenede"));
        assert!(text.contains("BEKLEYEN"));
    }

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(50, 10, area);

        assert_eq!(popup.height, 10);
        assert_eq!(popup.width, 50);
        assert_eq!(popup.y, 15);
    }
}
