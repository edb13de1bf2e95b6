use std::borrow::Cow;

use super::state::AppState;
use crate::config::RenderMode;
use crate::engine::{RunPhase, NODES, NODE_COUNT, STEPS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{self, Canvas},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const SIDEBAR_WIDTH: u16 = 36;
const SLIDER_WIDTH: usize = 20;

const GRAPH_X_BOUNDS: [f64; 2] = [-1.5, 11.5];
const GRAPH_Y_BOUNDS: [f64; 2] = [-1.0, 2.0];
/// Approximate canvas x units per label character, for centring labels
/// under their node.
const GRAPH_LABEL_CHAR_WIDTH: f64 = 0.12;

const INFO_SECTIONS: &[(&str, &[&str])] = &[
    (
        "🔐 What is TLS/SSL?",
        &[
            "TLS (Transport Layer Security) encrypts your data so nobody can read it in transit.",
            "• End-to-end encryption",
            "• Secure key exchange",
            "• Server authentication",
        ],
    ),
    (
        "🛡️ Role of firewalls",
        &[
            "Firewalls filter network traffic:",
            "• Block suspicious connections",
            "• Allow legitimate traffic",
            "• Inspect packets in real time",
        ],
    ),
    (
        "📡 What is a router?",
        &[
            "The router directs your packets:",
            "• Finds the best path",
            "• Forwards between networks",
            "• Uses routing tables",
        ],
    ),
];

pub fn draw(f: &mut Frame, state: &AppState, spinner_frame: u8) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(40)])
        .split(f.area());

    draw_sidebar(f, state, columns[0]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Length(5),
            Constraint::Min(6),
            Constraint::Length(7),
            Constraint::Length(1),
        ])
        .split(columns[1]);

    draw_header(f, state, chunks[0], spinner_frame);
    draw_metrics(f, state, chunks[1]);
    match state.render_mode {
        RenderMode::Boxes => draw_boxes(f, state, chunks[2]),
        RenderMode::Graph => draw_graph(f, state, chunks[2]),
    }
    draw_status(f, state, chunks[3]);
    draw_step_catalogue(f, state, chunks[4]);
    draw_logs(f, state, chunks[5]);
    draw_footer(f, state, chunks[6]);
}

fn draw_header(f: &mut Frame, state: &AppState, area: Rect, spinner_frame: u8) {
    let activity = if state.snapshot.is_running {
        let ch = SPINNER_FRAMES[(spinner_frame as usize) % SPINNER_FRAMES.len()];
        Span::styled(format!("  {} RUNNING", ch), Style::default().fg(Color::Cyan))
    } else {
        Span::raw("")
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(
                "🌐 Network Packet Visualizer",
                Style::default().fg(Color::LightBlue).add_modifier(Modifier::BOLD),
            ),
            activity,
        ]),
        Line::from(Span::styled(
            "Visualize the secure journey of your data across the Internet",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let para = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_metrics(f: &mut Frame, state: &AppState, area: Rect) {
    let snap = &state.snapshot;
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let metrics = [
        (" ⏱️ Elapsed ", format_elapsed(snap.elapsed_seconds)),
        (" 🔄 Hops ", snap.hop_count.to_string()),
        (" 🛡️ Security checks ", snap.security_check_count.to_string()),
    ];

    for ((label, value), cell) in metrics.into_iter().zip(cells.iter()) {
        let para = Paragraph::new(Line::from(Span::styled(
            value,
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(Block::default().title(label).borders(Borders::ALL));
        f.render_widget(para, *cell);
    }
}

fn node_style(index: usize, state: &AppState) -> Style {
    let snap = &state.snapshot;
    if index == snap.current_node_index {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if snap.phase != RunPhase::Idle && index < snap.current_node_index {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn diagram_block(state: &AppState) -> Block<'static> {
    Block::default()
        .title(format!(" 🗺️ Packet route [{}] ", state.render_mode.label()))
        .borders(Borders::ALL)
}

fn draw_boxes(f: &mut Frame, state: &AppState, area: Rect) {
    let block = diagram_block(state);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, NODE_COUNT as u32); NODE_COUNT])
        .split(rows[0]);

    for (i, (node, slot)) in NODES.iter().zip(slots.iter()).enumerate() {
        let style = node_style(i, state);
        let label_width = slot.width.saturating_sub(2) as usize;
        let para = Paragraph::new(vec![
            Line::from(node.icon),
            Line::from(Span::styled(
                truncate_with_ellipsis(node.label, label_width).into_owned(),
                style,
            )),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(style));
        f.render_widget(para, *slot);
    }

    let track = track_line(
        rows[1].width,
        state.snapshot.marker.slot(),
        state.snapshot.packet_marker_glyph,
    );
    f.render_widget(Paragraph::new(track), rows[1]);
}

/// Connection line with the packet glyph at its node slot.
fn track_line(width: u16, slot: f64, glyph: &'static str) -> Line<'static> {
    let offset = marker_offset(width, slot) as usize;
    let rest = (width as usize).saturating_sub(offset + 2);
    Line::from(vec![
        Span::styled("─".repeat(offset), Style::default().fg(Color::DarkGray)),
        Span::styled(glyph, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled("─".repeat(rest), Style::default().fg(Color::DarkGray)),
    ])
}

/// Column where a two-cell glyph is centred under node slot `slot`
/// (fractional while in transit) across `width` equal columns.
fn marker_offset(width: u16, slot: f64) -> u16 {
    if width < 2 {
        return 0;
    }
    let column = width as f64 / NODE_COUNT as f64;
    let centre = slot.clamp(0.0, (NODE_COUNT - 1) as f64) * column + column / 2.0;
    let x = (centre - 1.0).round().max(0.0) as u16;
    x.min(width - 2)
}

fn draw_graph(f: &mut Frame, state: &AppState, area: Rect) {
    let snap = &state.snapshot;
    let marker = snap.marker.position();
    let glyph = snap.packet_marker_glyph;
    let styles: Vec<Style> = (0..NODE_COUNT).map(|i| node_style(i, state)).collect();

    let canvas = Canvas::default()
        .block(diagram_block(state))
        .x_bounds(GRAPH_X_BOUNDS)
        .y_bounds(GRAPH_Y_BOUNDS)
        .paint(move |ctx| {
            for pair in NODES.windows(2) {
                ctx.draw(&canvas::Line {
                    x1: pair[0].position.x,
                    y1: pair[0].position.y,
                    x2: pair[1].position.x,
                    y2: pair[1].position.y,
                    color: Color::DarkGray,
                });
            }
            ctx.layer();
            for (node, style) in NODES.iter().zip(styles.iter()) {
                ctx.print(node.position.x, node.position.y, Span::styled(node.icon, *style));
                let half = node.label.chars().count() as f64 / 2.0 * GRAPH_LABEL_CHAR_WIDTH;
                ctx.print(
                    node.position.x - half,
                    node.position.y - 0.6,
                    Span::styled(node.label, *style),
                );
            }
            ctx.print(
                marker.x,
                marker.y + 0.6,
                Span::styled(glyph, Style::default().add_modifier(Modifier::BOLD)),
            );
        });
    f.render_widget(canvas, area);
}

fn draw_status(f: &mut Frame, state: &AppState, area: Rect) {
    let snap = &state.snapshot;
    let (title, body, color) = match snap.phase {
        RunPhase::Completed => (
            Line::from(Span::styled(
                "✅ Transmission successful!",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            "The packet was delivered. All security checks passed.",
            Color::Green,
        ),
        RunPhase::Idle if snap.current_step_index == 0 => (
            Line::from(Span::styled(
                "👆 Ready to start",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            "Press [s] to launch the simulation",
            Color::Yellow,
        ),
        _ => {
            let step = STEPS.get(snap.current_step_index).unwrap_or(&STEPS[0]);
            let mut spans = vec![Span::styled(
                step.title,
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if step.is_security_relevant {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(
                    " 🔒 Secured ",
                    Style::default().fg(Color::Black).bg(Color::Green),
                ));
            }
            (Line::from(spans), step.description, Color::LightBlue)
        }
    };

    let para = Paragraph::new(vec![title, Line::from(body)])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(" Current step ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    f.render_widget(para, area);
}

fn draw_step_catalogue(f: &mut Frame, state: &AppState, area: Rect) {
    let block = Block::default()
        .title(" 📋 All transmission steps ")
        .borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(inner);

    let snap = &state.snapshot;
    for (c, column) in columns.iter().enumerate() {
        let mut lines = Vec::new();
        for (i, step) in STEPS.iter().enumerate().filter(|(i, _)| i % 3 == c) {
            let indicator = if step.is_security_relevant { "🔒" } else { "🔓" };
            let title_style = if snap.phase != RunPhase::Idle && i == snap.current_step_index {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if snap.phase != RunPhase::Idle && i < snap.current_step_index {
                Style::default().fg(Color::Green)
            } else {
                Style::default()
            };
            lines.push(Line::from(vec![
                Span::raw(format!(" {} ", indicator)),
                Span::styled(step.title, title_style),
            ]));
            lines.push(if step.is_security_relevant {
                Line::from(Span::styled(
                    "    includes security measures",
                    Style::default().fg(Color::Green),
                ))
            } else {
                Line::from(Span::styled(
                    "    standard transmission step",
                    Style::default().fg(Color::DarkGray),
                ))
            });
            if state.show_step_details {
                lines.push(Line::from(Span::styled(
                    format!("    {}", step.description),
                    Style::default().fg(Color::Gray),
                )));
            }
        }
        f.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }),
            *column,
        );
    }
}

fn draw_sidebar(f: &mut Frame, state: &AppState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0), Constraint::Length(4)])
        .split(area);

    draw_controls(f, state, chunks[0]);
    draw_info(f, state, chunks[1]);
    draw_advisory(f, state, chunks[2]);
}

fn draw_controls(f: &mut Frame, state: &AppState, area: Rect) {
    let value_width = area.width.saturating_sub(16) as usize;
    let destination = if state.editing_destination {
        Span::styled(
            format!("{}▏", state.edit_buffer),
            Style::default().fg(Color::Yellow),
        )
    } else {
        Span::raw(truncate_with_ellipsis(&state.destination, value_width).into_owned())
    };

    let protocol_color = if state.protocol.is_secure() { Color::Green } else { Color::Red };
    let start_style = if state.snapshot.is_running {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    };

    let lines = vec![
        Line::from(vec![Span::raw(" 🌐 Destination "), destination]),
        Line::from(vec![
            Span::raw(" 🔐 Protocol    "),
            Span::styled(state.protocol.label(), Style::default().fg(protocol_color)),
        ]),
        Line::from(format!(" ⚡ Speed       {:.1}x", state.speed.get())),
        Line::from(Span::styled(
            format!("    {}", slider_bar(state.speed_fraction(), SLIDER_WIDTH)),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(format!(" 🗺️ View        {}", state.render_mode.label())),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [s] 🚀 Start", start_style),
            Span::raw("   "),
            Span::styled("[r] 🔄 Reset", Style::default().fg(Color::Yellow)),
        ]),
    ];

    let para = Paragraph::new(lines)
        .block(Block::default().title(" ⚙️ Controls ").borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_info(f: &mut Frame, state: &AppState, area: Rect) {
    let mut lines = Vec::new();
    if state.show_info {
        for (title, body) in INFO_SECTIONS {
            lines.push(Line::from(Span::styled(
                *title,
                Style::default().add_modifier(Modifier::BOLD),
            )));
            for text in body.iter() {
                lines.push(Line::from(*text));
            }
            lines.push(Line::from(""));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "[i] show explanations",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().title(" 📊 Information ").borders(Borders::ALL));
    f.render_widget(para, area);
}

fn draw_advisory(f: &mut Frame, state: &AppState, area: Rect) {
    let (title, body) = state.protocol.advisory();
    let color = if state.protocol.is_secure() { Color::Green } else { Color::Yellow };
    let para = Paragraph::new(vec![
        Line::from(Span::styled(title, Style::default().fg(color).add_modifier(Modifier::BOLD))),
        Line::from(body),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );
    f.render_widget(para, area);
}

fn draw_logs(f: &mut Frame, state: &AppState, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize;
    let visible_lines = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = state
        .logs
        .iter()
        .rev()
        .take(visible_lines)
        .map(|l| {
            let color = match l.level.as_str() {
                "WARN" => Color::Yellow,
                "STEP" => Color::Cyan,
                _ => Color::DarkGray,
            };
            let prefix = format!(" {} [{}] ", l.time, l.level);
            let msg_max = max_width.saturating_sub(prefix.len());
            let msg = truncate_with_ellipsis(&l.message, msg_max);
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(color)),
                Span::raw(msg.into_owned()),
            ])
        })
        .collect();

    let block = Block::default().title(" Event Log ").borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, state: &AppState, area: Rect) {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
    let line = if state.editing_destination {
        Line::from(vec![
            key("  [Enter]"),
            Span::raw(" save  "),
            key("[Esc]"),
            Span::raw(" cancel  "),
        ])
    } else {
        Line::from(vec![
            key("  [s]"),
            Span::raw("tart  "),
            key("[r]"),
            Span::raw("eset  "),
            key("[+/-]"),
            Span::raw(" speed  "),
            key("[p]"),
            Span::raw("rotocol  "),
            key("[v]"),
            Span::raw("iew  "),
            key("[e]"),
            Span::raw("dit dest  "),
            key("[i]"),
            Span::raw("nfo  "),
            key("[d]"),
            Span::raw("etails  "),
            key("[q]"),
            Span::raw("uit  "),
        ])
    };
    f.render_widget(Paragraph::new(line), area);
}

fn format_elapsed(secs: f64) -> String {
    format!("{:.1}s", secs.max(0.0))
}

/// `━━━━●─────` style slider with the knob at `fraction`.
fn slider_bar(fraction: f64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let knob = (fraction.clamp(0.0, 1.0) * (width - 1) as f64).round() as usize;
    let mut bar = String::with_capacity(width * 3);
    for i in 0..width {
        bar.push(match i.cmp(&knob) {
            std::cmp::Ordering::Less => '━',
            std::cmp::Ordering::Equal => '●',
            std::cmp::Ordering::Greater => '─',
        });
    }
    bar
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_count = s.chars().count();
    if char_count <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 3 {
        Cow::Owned(".".repeat(max_width))
    } else {
        let end = s
            .char_indices()
            .nth(max_width - 3)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        Cow::Owned(format!("{}...", &s[..end]))
    }
}
