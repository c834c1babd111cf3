use ratatui::{
    prelude::*,
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph},
};

use crate::core::net_monitor::ChartView;
use crate::ui::formatters::{format_clock, format_rate};

use super::app::MonitorApp;

/// Main render function
pub fn render_ui(frame: &mut Frame, app: &MonitorApp) {
    let area = frame.area();

    let snapshot = app.feed.latest();
    let view = app.feed.current_view();

    let has_alerts = !snapshot.alerts.is_empty();
    let alert_height = if has_alerts {
        (snapshot.alerts.len().min(3) + 2) as u16
    } else {
        0
    };

    let constraints = if has_alerts {
        vec![
            Constraint::Length(3),            // Header
            Constraint::Length(alert_height), // Alerts banner
            Constraint::Percentage(33),       // Latency
            Constraint::Percentage(22),       // Packet loss
            Constraint::Percentage(45),       // Upload/download
            Constraint::Length(1),            // Footer
        ]
    } else {
        vec![
            Constraint::Length(3),
            Constraint::Percentage(33),
            Constraint::Percentage(22),
            Constraint::Percentage(45),
            Constraint::Length(1),
        ]
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    if has_alerts {
        render_header(frame, chunks[0], app);
        render_alerts_banner(frame, chunks[1], app);
        render_latency_panel(frame, chunks[2], app, &view);
        render_loss_panel(frame, chunks[3], app, &view);
        render_bandwidth_panel(frame, chunks[4], app, &view);
        render_footer(frame, chunks[5]);
    } else {
        render_header(frame, chunks[0], app);
        render_latency_panel(frame, chunks[1], app, &view);
        render_loss_panel(frame, chunks[2], app, &view);
        render_bandwidth_panel(frame, chunks[3], app, &view);
        render_footer(frame, chunks[4]);
    }

    if app.show_help {
        render_help_overlay(frame, area);
    }
}

/// Header with the run configuration and the newest readings
fn render_header(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let snapshot = app.feed.latest();

    let status = match snapshot.latest() {
        Some(sample) if sample.unreachable() => " UNREACHABLE ".to_string(),
        Some(sample) => format!(
            " {:.1} ms │ ↑ {} │ ↓ {} ",
            sample.latency_ms,
            format_rate(sample.sent_bps),
            format_rate(sample.recv_bps)
        ),
        None => " waiting for first sample ".to_string(),
    };

    let border_color = match snapshot.latest() {
        Some(sample) if sample.unreachable() => Color::Red,
        _ => Color::Cyan,
    };

    let title = format!(
        " {} │ every {} ms │ window {}/{} │{}",
        app.config.host,
        app.config.interval_ms,
        snapshot.samples.len(),
        app.config.window_capacity,
        status
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    frame.render_widget(block, area);
}

/// Banner listing the alerts raised by the newest sample
fn render_alerts_banner(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let snapshot = app.feed.latest();

    let block = Block::default()
        .title(" ALERTS ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let shown = snapshot.alerts.len().min(3);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); shown])
        .split(inner);

    for (i, alert) in snapshot.alerts.iter().take(shown).enumerate() {
        let text = Paragraph::new(format!("[{}] {}", format_clock(alert.timestamp), alert.message))
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD));
        frame.render_widget(text, layout[i]);
    }
}

fn render_latency_panel(frame: &mut Frame, area: Rect, app: &MonitorApp, view: &ChartView) {
    let points = indexed(&view.latency_ms);
    let max_latency = view.latency_ms.iter().cloned().fold(0.0_f64, f64::max);
    let y_max = (max_latency * 1.2).max(50.0);

    let datasets = vec![Dataset::default()
        .name("latency")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Yellow))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Latency (ms) ")
                .borders(Borders::ALL),
        )
        .x_axis(time_axis(view, app.config.window_capacity))
        .y_axis(value_axis(y_max, format!("{:.0}", y_max)));

    frame.render_widget(chart, area);
}

fn render_loss_panel(frame: &mut Frame, area: Rect, app: &MonitorApp, view: &ChartView) {
    let points = indexed(&view.packet_loss_pct);

    let datasets = vec![Dataset::default()
        .name("loss")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Red))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Packet Loss (%) ")
                .borders(Borders::ALL),
        )
        .x_axis(time_axis(view, app.config.window_capacity))
        .y_axis(value_axis(100.0, "100".to_string()));

    frame.render_widget(chart, area);
}

fn render_bandwidth_panel(frame: &mut Frame, area: Rect, app: &MonitorApp, view: &ChartView) {
    let upload = indexed(&view.upload_mbps);
    let download = indexed(&view.download_mbps);

    let max_rate = view
        .upload_mbps
        .iter()
        .chain(view.download_mbps.iter())
        .cloned()
        .fold(0.0_f64, f64::max);
    let y_max = (max_rate * 1.2).max(1.0);

    let datasets = vec![
        Dataset::default()
            .name("upload")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Blue))
            .data(&upload),
        Dataset::default()
            .name("download")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&download),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Bandwidth (MB/s) ")
                .borders(Borders::ALL),
        )
        .x_axis(time_axis(view, app.config.window_capacity))
        .y_axis(value_axis(y_max, format!("{:.1}", y_max)));

    frame.render_widget(chart, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let footer = Paragraph::new(" q: quit │ ?: help ")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let width = 40.min(area.width);
    let height = 8.min(area.height);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    let text = vec![
        Line::from("q / Esc    quit"),
        Line::from("? / h      toggle this help"),
        Line::from(""),
        Line::from("Charts show the most recent samples;"),
        Line::from("oldest on the left, newest on the right."),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(text).block(block), popup);
}

/// Pair each value with its window index for plotting
fn indexed(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect()
}

fn time_axis(view: &ChartView, capacity: usize) -> Axis<'static> {
    let x_max = capacity.saturating_sub(1).max(1) as f64;
    let labels = match (view.timestamps.first(), view.timestamps.last()) {
        (Some(first), Some(last)) if view.timestamps.len() > 1 => {
            vec![
                Span::raw(format_clock(*first)),
                Span::raw(format_clock(*last)),
            ]
        }
        _ => vec![Span::raw(""), Span::raw("")],
    };

    Axis::default()
        .style(Style::default().fg(Color::DarkGray))
        .bounds([0.0, x_max])
        .labels(labels)
}

fn value_axis(y_max: f64, top_label: String) -> Axis<'static> {
    Axis::default()
        .style(Style::default().fg(Color::DarkGray))
        .bounds([0.0, y_max])
        .labels(vec![Span::raw("0"), Span::raw(top_label)])
}
