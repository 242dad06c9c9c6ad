//! Rendering adapter: materializes the current model with ratatui.
//!
//! The table widget is rebuilt from the [`MatrixTable`] value on every
//! frame; nothing is patched incrementally.
//!
//! [`MatrixTable`]: crate::matrix::table::MatrixTable

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use crate::matrix::classify::CellClass;
use super::model::MatrixModel;

/// Style for a cell class.
fn class_style(class: CellClass) -> Style {
    match class {
        CellClass::Ipv6 => Style::default().fg(Color::Green),
        CellClass::Ipv6DualstackOptin => Style::default().fg(Color::Yellow),
        CellClass::Ipv4 => Style::default().fg(Color::Red),
        CellClass::Unavailable => Style::default().fg(Color::DarkGray),
    }
}

/// Draw one frame.
pub fn render(frame: &mut Frame, model: &MatrixModel) {
    let [caption_area, table_area, detail_area, help_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(3),
        Constraint::Length(6),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_caption(frame, caption_area, model);
    render_table(frame, table_area, model);
    render_detail(frame, detail_area, model);
    render_help(frame, help_area, model);

    if model.picker_open {
        render_picker(frame, model);
    }
}

fn render_caption(frame: &mut Frame, area: Rect, model: &MatrixModel) {
    let mut lines = vec![Line::from(Span::styled(
        model.caption.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    if let Some(stats) = &model.stats {
        lines.push(Line::from(vec![
            Span::styled(
                format!("IPv6 by default {}%", stats.ipv6_default_pct()),
                class_style(CellClass::Ipv6),
            ),
            Span::raw(" · "),
            Span::styled(
                format!("opt-in {}%", stats.ipv6_dualstack_pct()),
                class_style(CellClass::Ipv6DualstackOptin),
            ),
            Span::raw(" · "),
            Span::styled(
                format!("IPv4 only {}%", stats.ipv4_only_pct()),
                class_style(CellClass::Ipv4),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn render_table(frame: &mut Frame, area: Rect, model: &MatrixModel) {
    if model.degraded || model.table.column_count() == 0 {
        return;
    }

    let service_width = model
        .table
        .rows
        .iter()
        .map(|r| r.service.len())
        .max()
        .unwrap_or(10)
        .clamp(8, 28) as u16;

    // Column window: as many region columns as fit, keeping the cursor visible.
    let column_width = 14u16;
    let available = area.width.saturating_sub(service_width + 1);
    let max_columns = usize::from(available / (column_width + 1)).max(1);
    let first_col = model
        .cursor_col
        .saturating_sub(max_columns.saturating_sub(1));
    let columns: Vec<usize> = (first_col..model.table.column_count())
        .take(max_columns)
        .collect();

    // Row window around the cursor.
    let visible_rows = model.visible_row_indices();
    let capacity = usize::from(area.height.saturating_sub(2)).max(1);
    let first_row = model.cursor_row.saturating_sub(capacity.saturating_sub(1));

    let header_cells = std::iter::once(Cell::from("Service")).chain(columns.iter().map(|&c| {
        let column = &model.table.columns[c];
        Cell::from(Text::from(vec![
            Line::from(column.region_name.clone()),
            Line::from(Span::styled(
                column.short_label.clone(),
                Style::default().fg(Color::DarkGray),
            )),
        ]))
    }));
    let header = Row::new(header_cells)
        .height(2)
        .style(Style::default().add_modifier(Modifier::BOLD));

    let rows = visible_rows
        .iter()
        .enumerate()
        .skip(first_row)
        .take(capacity)
        .map(|(visible_index, &row_index)| {
            let row = &model.table.rows[row_index];
            let cells = std::iter::once(Cell::from(row.service.clone())).chain(
                columns.iter().map(|&c| {
                    let cell = &row.cells[c];
                    let mut style = class_style(cell.class);
                    if visible_index == model.cursor_row && c == model.cursor_col {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    Cell::from(cell.text).style(style)
                }),
            );
            Row::new(cells)
        });

    let widths = std::iter::once(Constraint::Length(service_width))
        .chain(columns.iter().map(|_| Constraint::Length(column_width)));

    frame.render_widget(Table::new(rows, widths).header(header), area);
}

fn render_detail(frame: &mut Frame, area: Rect, model: &MatrixModel) {
    let block = Block::default().borders(Borders::TOP);
    let mut lines = Vec::new();

    let visible = model.visible_row_indices();
    if let Some(&row_index) = visible.get(model.cursor_row) {
        let row = &model.table.rows[row_index];
        if let Some(cell) = row.cells.get(model.cursor_col) {
            let region = &model.table.columns[model.cursor_col].region_name;
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{} @ {region}", row.service),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(cell.text, class_style(cell.class)),
            ]));
            for detail in &cell.detail {
                lines.push(Line::from(format!("  {detail}")));
            }
        }
    }

    if let Some(tooltip) = &model.tooltip {
        if let Some(body) = &tooltip.body {
            lines.push(Line::from(Span::styled(
                format!("notes: {}", tooltip.service),
                Style::default().fg(Color::Cyan),
            )));
            for text_line in body.lines().take(2) {
                lines.push(Line::from(format!("  {}", text_line.trim())));
            }
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help(frame: &mut Frame, area: Rect, model: &MatrixModel) {
    let help = if model.picker_open {
        "type filter · space toggle · ctrl-a all · ctrl-d none · ctrl-r reset · esc close"
    } else if model.filter_editing {
        "type to filter services · enter keep · esc clear"
    } else {
        "r regions · / filter · t notes · x reset · arrows move · q quit"
    };
    frame.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(Color::DarkGray))),
        area,
    );
}

fn render_picker(frame: &mut Frame, model: &MatrixModel) {
    let area = centered_rect(frame.area(), 60, 80);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Select regions [{}] ", model.picker_filter));

    let inner_height = usize::from(area.height.saturating_sub(2)).max(1);
    let visible = model.visible_picker_indices();
    let first = model
        .picker_cursor
        .saturating_sub(inner_height.saturating_sub(1));

    let lines: Vec<Line> = visible
        .iter()
        .enumerate()
        .skip(first)
        .take(inner_height)
        .map(|(visible_index, &entry_index)| {
            let entry = &model.picker_entries[entry_index];
            let mark = if model.picker_checked[entry_index] {
                "[x]"
            } else {
                "[ ]"
            };
            let mut style = Style::default();
            if visible_index == model.picker_cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Line::from(Span::styled(format!("{mark} {}", entry.label), style))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let [_, vertical, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);
    let [_, horizontal, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(vertical);
    horizontal
}
