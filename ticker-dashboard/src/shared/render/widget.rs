//! Frame layout: quote table, chart panel grid and footer

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use super::style::{parse_style, tone_style};
use crate::shared::{
    config::{ColumnSpec, Justify},
    present::{ChartPanel, DisplayModel, DisplayRow},
};

/// Draw one full dashboard frame
pub fn draw_dashboard(f: &mut Frame, model: &DisplayModel, chart_columns: usize) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    if model.panels.is_empty() {
        render_table(f, model, chunks[0]);
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(2, 5), Constraint::Ratio(3, 5)])
            .split(chunks[0]);
        render_table(f, model, body[0]);
        render_panels(f, &model.panels, chart_columns, body[1]);
    }

    let footer = Paragraph::new(model.footer.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, chunks[1]);
}

fn render_table(f: &mut Frame, model: &DisplayModel, area: Rect) {
    let header_cells = model.columns.iter().map(|column| {
        Cell::from(aligned(&column.name, column.justify))
            .style(parse_style(&column.style).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells).height(1);

    let rows = model.rows.iter().map(|row| table_row(row, &model.columns));

    let count = model.columns.len().max(1) as u32;
    let widths = vec![Constraint::Ratio(1, count); model.columns.len()];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(model.title.as_str())
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(table, area);
}

/// Cells beyond the configured columns are dropped, missing ones left blank
fn table_row<'a>(row: &'a DisplayRow, columns: &[ColumnSpec]) -> Row<'a> {
    let cells = columns.iter().enumerate().map(|(index, column)| {
        let style = parse_style(&column.style);
        match row.cells.get(index) {
            Some(cell) => {
                let style = match cell.tone {
                    Some(tone) => style.patch(tone_style(tone)),
                    None => style,
                };
                Cell::from(aligned(&cell.text, column.justify)).style(style)
            }
            None => Cell::from(""),
        }
    });
    Row::new(cells).height(1)
}

fn aligned(text: &str, justify: Justify) -> Line<'_> {
    let alignment = match justify {
        Justify::Left => Alignment::Left,
        Justify::Center => Alignment::Center,
        Justify::Right => Alignment::Right,
    };
    Line::from(text).alignment(alignment)
}

/// Panels in a grid of `chart_columns` per row, filled row by row
fn render_panels(f: &mut Frame, panels: &[ChartPanel], chart_columns: usize, area: Rect) {
    let per_row = chart_columns.max(1);
    let grid_rows = panels.len().div_ceil(per_row);

    let row_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, grid_rows as u32); grid_rows])
        .split(area);

    for (row_area, row_panels) in row_areas.iter().zip(panels.chunks(per_row)) {
        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, per_row as u32); per_row])
            .split(*row_area);

        for (cell, panel) in cells.iter().zip(row_panels) {
            let widget = Paragraph::new(panel.content()).block(
                Block::default()
                    .title(panel.title.as_str())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Gray)),
            );
            f.render_widget(widget, *cell);
        }
    }
}
