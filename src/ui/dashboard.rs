use crate::model::{Pool, StructuralMode};
use crate::ui::app::{App, FocusPanel, ValueInput};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, Paragraph, Row, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Table,
    },
    Frame,
};

const BRAND_DARK: Color = Color::Rgb(0x1F, 0x2F, 0x3C);
const BRAND_SELECT_BG: Color = Color::Rgb(0xC3, 0xD3, 0xE0);
const BRAND_GREEN: Color = Color::Rgb(0x82, 0x9A, 0x68);
const BRAND_ORANGE: Color = Color::Rgb(0x9E, 0x68, 0x3C);
const BRAND_MUTED: Color = Color::Rgb(0x71, 0x65, 0x65);

const HEADER_STYLE: Style = Style::new().fg(BRAND_DARK).add_modifier(Modifier::BOLD);
const SELECTED_STYLE: Style = Style::new()
    .bg(BRAND_SELECT_BG)
    .fg(BRAND_DARK)
    .add_modifier(Modifier::BOLD);
const MONEY_COLOR: Color = BRAND_GREEN;
const OVERRIDE_COLOR: Color = BRAND_ORANGE;

/// Thousands-separated amount with two decimals, e.g. `1.234.567,89`.
fn money(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int, frac) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped},{frac} ₺")
}

fn row_style(is_selected: bool, is_focused: bool) -> Style {
    if is_selected && is_focused {
        SELECTED_STYLE
    } else if is_selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn panel_block(title: String, is_focused: bool) -> Block<'static> {
    let border_style = if is_focused {
        Style::default().fg(BRAND_ORANGE)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

pub fn draw_dashboard(frame: &mut Frame, app: &App) {
    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Min(10),   // Main content
        Constraint::Length(3), // Totals
        Constraint::Length(3), // Footer
    ])
    .split(frame.area());

    draw_header(frame, chunks[0], app);
    draw_main_content(frame, chunks[1], app);
    draw_totals(frame, chunks[2], app);

    let help = " ←→ Panel | ↑↓ Select | Enter Unit | m/M Mode | +/- Count | e/p Qty/Price | c Clear | q Quit ";
    match &app.input {
        Some(input) => draw_footer(frame, chunks[3], &input_prompt(input)),
        None => draw_footer(frame, chunks[3], app.status.as_deref().unwrap_or(help)),
    }
}

fn input_prompt(input: &ValueInput) -> String {
    format!(
        " Manual {} for {}: {}_  (Enter save, empty for automatic, Esc cancel) ",
        input.field.label(),
        input.item,
        input.buffer
    )
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        " Metraj | {} | {} units | {:.0} m² construction area ",
        app.project.name,
        app.project.total_units(),
        app.report.total_construction_area
    );

    let header = Paragraph::new(title)
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn draw_main_content(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::horizontal([
        Constraint::Percentage(25), // Units
        Constraint::Percentage(25), // Categories
        Constraint::Percentage(50), // Items
    ])
    .split(area);

    draw_units(frame, chunks[0], app);
    draw_categories(frame, chunks[1], app);
    draw_items(frame, chunks[2], app);
}

fn draw_units(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus_panel == FocusPanel::Units;
    let entries = app.get_unit_entries();

    let items: Vec<ListItem> = entries
        .iter()
        .enumerate()
        .map(|(i, (pool, unit))| {
            let is_selected = i == app.selected_unit;
            let pool_tag = match pool {
                Pool::Architectural => "A",
                Pool::Structural => "S",
            };
            let mode_tag = match unit.mode {
                StructuralMode::Global => "G",
                StructuralMode::Detailed => "D",
            };
            let scale_tag = if unit.scale.is_calibrated() { "" } else { " unscaled" };

            ListItem::new(Line::from(vec![
                Span::styled(format!("[{pool_tag}] "), Style::default().fg(BRAND_MUTED)),
                Span::styled(unit.name.as_str(), row_style(is_selected, is_focused)),
                Span::styled(format!(" ×{}", unit.count), Style::default().fg(MONEY_COLOR)),
                Span::styled(format!(" {mode_tag}{scale_tag}"), Style::default().fg(BRAND_MUTED)),
            ]))
        })
        .collect();

    let list = List::new(items).block(panel_block(format!(" Units ({}) ", entries.len()), is_focused));
    frame.render_widget(list, area);
}

fn draw_categories(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus_panel == FocusPanel::Categories;

    let items: Vec<ListItem> = app
        .report
        .categories
        .iter()
        .enumerate()
        .map(|(i, cat)| {
            let is_selected = i == app.selected_category;
            let marker = if is_selected && is_focused { " ◄" } else { "" };
            let mode_tag = if cat.switchable {
                format!(" [{}]", cat.mode.label())
            } else {
                String::new()
            };

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(cat.title.as_str(), row_style(is_selected, is_focused)),
                    Span::styled(mode_tag, Style::default().fg(BRAND_MUTED)),
                    Span::styled(marker, Style::default().fg(BRAND_ORANGE)),
                ]),
                Line::from(Span::styled(
                    format!("  {}", money(cat.total)),
                    Style::default().fg(MONEY_COLOR),
                )),
            ])
        })
        .collect();

    let list = List::new(items).block(panel_block(" Categories ".to_string(), is_focused));
    frame.render_widget(list, area);
}

fn draw_items(frame: &mut Frame, area: Rect, app: &App) {
    let is_focused = app.focus_panel == FocusPanel::Items;
    let Some(category) = app.get_selected_category() else {
        frame.render_widget(panel_block(" Items ".to_string(), is_focused), area);
        return;
    };

    let visible_rows = (area.height as usize).saturating_sub(3);
    let scroll_offset = if app.selected_item >= visible_rows {
        app.selected_item - visible_rows + 1
    } else {
        0
    };

    let header = Row::new(vec!["Item", "Quantity", "Unit Price", "Total"])
        .style(HEADER_STYLE)
        .height(1);

    let rows: Vec<Row> = category
        .items
        .iter()
        .enumerate()
        .skip(scroll_offset)
        .take(visible_rows)
        .map(|(i, item)| {
            let mark = |manual: bool| if manual { "*" } else { "" };
            let style = row_style(i == app.selected_item, is_focused);
            let style = if item.is_overridden() && i != app.selected_item {
                style.fg(OVERRIDE_COLOR)
            } else {
                style
            };

            Row::new(vec![
                item.name.clone(),
                format!("{:.2} {}{}", item.quantity, item.unit, mark(item.manual_quantity)),
                format!("{}{}", money(item.unit_price), mark(item.manual_price)),
                money(item.total),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(40),
        Constraint::Percentage(18),
        Constraint::Percentage(20),
        Constraint::Percentage(22),
    ];

    let title = format!(" {} ({} items) ", category.title, category.items.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel_block(title, is_focused));
    frame.render_widget(table, area);

    if category.items.len() > visible_rows {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(category.items.len()).position(app.selected_item);

        let scrollbar_area = Rect {
            x: area.x + area.width - 1,
            y: area.y + 2,
            width: 1,
            height: area.height - 3,
        };
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}

fn draw_totals(frame: &mut Frame, area: Rect, app: &App) {
    let report = &app.report;
    let line = Line::from(vec![
        Span::raw(" Structure "),
        Span::styled(money(report.structural_subtotal), Style::default().fg(MONEY_COLOR)),
        Span::raw("  |  Fit-out "),
        Span::styled(money(report.fitout_subtotal), Style::default().fg(MONEY_COLOR)),
        Span::raw("  |  Total "),
        Span::styled(money(report.project_total), HEADER_STYLE),
    ]);

    let totals = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(totals, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, help: &str) {
    let footer = Paragraph::new(help)
        .style(Style::default().fg(BRAND_MUTED))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}

pub fn draw_unit_detail(frame: &mut Frame, app: &App) {
    let (Some((pool, unit)), Some(takeoff)) = (app.get_selected_unit(), app.get_unit_takeoff()) else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(3), // Header
        Constraint::Length(3), // Info
        Constraint::Min(6),    // Stats
        Constraint::Length(3), // Footer
    ])
    .split(frame.area());

    let header = Paragraph::new(format!(" Unit: {} ", unit.name))
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    let pool_name = match pool {
        Pool::Architectural => "Unit type",
        Pool::Structural => "Floor plan",
    };
    let scale = if unit.scale.is_calibrated() {
        format!("{:.1} px/m", unit.scale.px_per_meter())
    } else {
        "unscaled".to_string()
    };
    let info_text = format!(
        "{pool_name}  |  {} floor  |  ×{}  |  {} mode  |  {scale}  |  {} elements  |  Preview {}",
        unit.floor_type.label(),
        unit.count,
        unit.mode.label(),
        unit.element_count(),
        money(takeoff.total_cost)
    );
    let info_widget = Paragraph::new(info_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(info_widget, chunks[1]);

    let entries = takeoff.stats.entries();
    let visible = (chunks[2].height as usize).saturating_sub(3);

    let rows: Vec<Row> = entries
        .iter()
        .skip(app.stats_scroll_offset)
        .take(visible)
        .map(|(key, value)| {
            let style = if value.abs() < f64::EPSILON {
                Style::default().fg(BRAND_MUTED)
            } else {
                Style::default()
            };
            Row::new(vec![key.clone(), format!("{value:.2}")]).style(style)
        })
        .collect();

    let widths = [Constraint::Percentage(50), Constraint::Percentage(50)];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["Quantity", "Value"]).style(HEADER_STYLE))
        .block(
            Block::default()
                .title(format!(" Stats ({}) ", entries.len()))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, chunks[2]);

    if entries.len() > visible {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(entries.len()).position(app.stats_scroll_offset);

        let scrollbar_area = Rect {
            x: chunks[2].x + chunks[2].width - 1,
            y: chunks[2].y + 2,
            width: 1,
            height: chunks[2].height - 3,
        };
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }

    draw_footer(
        frame,
        chunks[3],
        app.status
            .as_deref()
            .unwrap_or(" Esc Back | ↑↓ Scroll | m Mode | q Quit "),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_money_grouping() {
        assert_eq!(money(0.0), "0,00 ₺");
        assert_eq!(money(950.5), "950,50 ₺");
        assert_eq!(money(1_234_567.891), "1.234.567,89 ₺");
        assert_eq!(money(-2500.0), "-2.500,00 ₺");
    }

    #[test]
    fn test_input_prompt_shows_buffer() {
        let input = ValueInput {
            item: "Şap Atılması".to_string(),
            field: crate::ui::app::OverrideField::Price,
            buffer: "135,5".to_string(),
        };
        assert_eq!(
            input_prompt(&input),
            " Manual price for Şap Atılması: 135,5_  (Enter save, empty for automatic, Esc cancel) "
        );
    }
}
