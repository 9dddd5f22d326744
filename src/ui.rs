use chrono::Local;
use pomotui::{
    presentation::{Snapshot, Status},
    state::{BreakKind, PhaseKind},
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const HELP: &str = "s start · space pause/resume · r reset · q quit";
const HELP_SHORT: &str = "s · space · r · q";

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let frame = self.controller.presenter();
        let Some(snapshot) = frame.snapshot else {
            return;
        };

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let accent_bold_style = Style::default().patch(bold_style).fg(self.appearance.accent);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(0),    // top padding
                Constraint::Length(1), // status
                Constraint::Length(1), // padding
                Constraint::Length(1), // progress and countdown
                Constraint::Length(1), // padding
                Constraint::Length(1), // phase gauge
                Constraint::Length(1), // date
                Constraint::Min(0),    // bottom padding
                Constraint::Length(1), // error
                Constraint::Length(1), // help
            ])
            .split(area);

        let status = Paragraph::new(Line::from(vec![
            Span::styled(snapshot.status.to_string(), status_style(snapshot.status)),
            Span::styled(phase_hint(&snapshot), dim_style),
        ]))
        .alignment(Alignment::Center);
        status.render(chunks[1], buf);

        let time_line = Paragraph::new(Line::from(vec![
            Span::styled(snapshot.progress_text(), bold_style),
            Span::raw("   "),
            Span::styled(snapshot.countdown_text(), accent_bold_style),
        ]))
        .alignment(Alignment::Center);
        time_line.render(chunks[3], buf);

        if snapshot.phase.is_some() {
            let gauge_area = centered(chunks[5], 40);
            Gauge::default()
                .gauge_style(Style::default().fg(self.appearance.accent))
                .ratio(snapshot.phase_ratio().clamp(0.0, 1.0))
                .label("")
                .render(gauge_area, buf);
        }

        if self.appearance.show_date {
            let date = Paragraph::new(Span::styled(
                Local::now().format("%Y-%m-%d %A").to_string(),
                dim_style,
            ))
            .alignment(Alignment::Center);
            date.render(chunks[6], buf);
        }

        if let Some(ref error) = frame.error {
            let error_line = Paragraph::new(Span::styled(
                error.as_str(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center);
            error_line.render(chunks[8], buf);
        }

        let help = if HELP.width() as u16 <= chunks[9].width {
            HELP
        } else {
            HELP_SHORT
        };
        Paragraph::new(Span::styled(help, dim_style.add_modifier(Modifier::ITALIC)))
            .alignment(Alignment::Center)
            .render(chunks[9], buf);
    }
}

fn status_style(status: Status) -> Style {
    let color = match status {
        Status::Ready => Color::Gray,
        Status::Study => Color::Green,
        Status::Break => Color::Yellow,
        Status::Pause => Color::Magenta,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn phase_hint(snapshot: &Snapshot) -> &'static str {
    match snapshot.phase {
        Some(PhaseKind::Break(BreakKind::Long)) => " (long)",
        _ => "",
    }
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}
