use crate::cost::{CategoryCost, ProjectCost, ResolvedItem};
use crate::digitize::parse_number;
use crate::model::{Pool, Project, SpatialUnit};
use crate::session::EditSession;
use crate::takeoff::{compute_unit, UnitTakeoff};
use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{DefaultTerminal, Frame};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum View {
    Dashboard,
    UnitDetail,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusPanel {
    Units,
    Categories,
    Items,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OverrideField {
    Quantity,
    Price,
}

impl OverrideField {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            OverrideField::Quantity => "quantity",
            OverrideField::Price => "price",
        }
    }
}

/// Manual value being typed for one item. An empty buffer clears the field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueInput {
    pub item: String,
    pub field: OverrideField,
    pub buffer: String,
}

pub struct App {
    pub project: Project,
    pub report: ProjectCost,
    pub view: View,
    pub focus_panel: FocusPanel,
    pub selected_unit: usize,
    pub selected_category: usize,
    pub selected_item: usize,
    pub stats_scroll_offset: usize,
    pub input: Option<ValueInput>,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl App {
    #[must_use]
    pub fn new(project: Project) -> Self {
        let report = project.cost();
        Self {
            project,
            report,
            view: View::Dashboard,
            focus_panel: FocusPanel::Units,
            selected_unit: 0,
            selected_category: 0,
            selected_item: 0,
            stats_scroll_offset: 0,
            input: None,
            status: None,
            should_quit: false,
        }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            self.handle_events()?;
        }
        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => super::dashboard::draw_dashboard(frame, self),
            View::UnitDetail => super::dashboard::draw_unit_detail(frame, self),
        }
    }

    fn handle_events(&mut self) -> Result<()> {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.view {
                View::Dashboard if self.input.is_some() => self.handle_input_keys(key.code),
                View::Dashboard => self.handle_dashboard_keys(key.code),
                View::UnitDetail => self.handle_detail_keys(key.code),
            }
        }
        Ok(())
    }

    pub fn handle_dashboard_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.navigate_up(),
            KeyCode::Down | KeyCode::Char('j') => self.navigate_down(),
            KeyCode::Left | KeyCode::Char('h') => self.navigate_left(),
            KeyCode::Right | KeyCode::Char('l') => self.navigate_right(),
            KeyCode::Enter => self.enter_unit_detail(),
            KeyCode::Char('m') if self.focus_panel == FocusPanel::Categories => {
                self.toggle_category_mode();
            }
            KeyCode::Char('m') => self.toggle_selected_mode(),
            KeyCode::Char('M') => self.toggle_selected_pool_mode(),
            KeyCode::Char('+') => self.adjust_selected_count(1),
            KeyCode::Char('-') => self.adjust_selected_count(-1),
            KeyCode::Char('e') => self.start_input(OverrideField::Quantity),
            KeyCode::Char('p') => self.start_input(OverrideField::Price),
            KeyCode::Char('c') => self.clear_selected_override(),
            _ => {}
        }
    }

    pub fn handle_input_keys(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.input = None,
            KeyCode::Enter => self.commit_input(),
            KeyCode::Backspace => {
                if let Some(input) = self.input.as_mut() {
                    input.buffer.pop();
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == ',' => {
                if let Some(input) = self.input.as_mut() {
                    input.buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn navigate_up(&mut self) {
        match self.focus_panel {
            FocusPanel::Units => self.selected_unit = self.selected_unit.saturating_sub(1),
            FocusPanel::Categories => {
                if self.selected_category > 0 {
                    self.selected_category -= 1;
                    self.selected_item = 0;
                }
            }
            FocusPanel::Items => self.selected_item = self.selected_item.saturating_sub(1),
        }
    }

    fn navigate_down(&mut self) {
        match self.focus_panel {
            FocusPanel::Units => {
                if self.selected_unit < self.get_unit_entries().len().saturating_sub(1) {
                    self.selected_unit += 1;
                }
            }
            FocusPanel::Categories => {
                if self.selected_category < self.report.categories.len().saturating_sub(1) {
                    self.selected_category += 1;
                    self.selected_item = 0;
                }
            }
            FocusPanel::Items => {
                let count = self.get_selected_category().map_or(0, |c| c.items.len());
                if self.selected_item < count.saturating_sub(1) {
                    self.selected_item += 1;
                }
            }
        }
    }

    fn navigate_left(&mut self) {
        match self.focus_panel {
            FocusPanel::Items => self.focus_panel = FocusPanel::Categories,
            FocusPanel::Categories => self.focus_panel = FocusPanel::Units,
            FocusPanel::Units => {}
        }
    }

    fn navigate_right(&mut self) {
        match self.focus_panel {
            FocusPanel::Units => self.focus_panel = FocusPanel::Categories,
            FocusPanel::Categories => self.focus_panel = FocusPanel::Items,
            FocusPanel::Items => {}
        }
    }

    fn enter_unit_detail(&mut self) {
        if self.focus_panel == FocusPanel::Units && self.get_selected_unit().is_some() {
            self.view = View::UnitDetail;
            self.stats_scroll_offset = 0;
        }
    }

    fn refresh(&mut self) {
        self.report = self.project.cost();
    }

    /// Flips the selected unit between global and detailed through an edit
    /// session, so the change is committed like any other unit edit.
    fn toggle_selected_mode(&mut self) {
        let Some((pool, id)) = self.get_selected_unit().map(|(pool, unit)| (pool, unit.id)) else {
            return;
        };
        let Some(mut session) = EditSession::begin(&self.project, pool, id) else {
            return;
        };

        let mode = session.toggle_mode();
        let name = session.unit().name.clone();
        self.status = Some(match session.commit(&mut self.project) {
            Ok(()) => format!("{name}: {} mode", mode.label()),
            Err(err) => err.to_string(),
        });
        self.refresh();
    }

    fn toggle_selected_pool_mode(&mut self) {
        let Some(pool) = self.get_selected_unit().map(|(pool, _)| pool) else {
            return;
        };
        let mode = self.project.toggle_pool_mode(pool);
        self.status = Some(format!("{}: all {} mode", pool.label(), mode.label()));
        self.refresh();
    }

    fn toggle_category_mode(&mut self) {
        let Some((id, title, switchable)) = self
            .get_selected_category()
            .map(|c| (c.id.clone(), c.title.clone(), c.switchable))
        else {
            return;
        };
        if !switchable {
            self.status = Some(format!("{title}: no global/detailed switch"));
            return;
        }
        let mode = self.project.category_modes.toggle(&id);
        self.status = Some(format!("{title}: {} mode", mode.label()));
        self.refresh();
    }

    fn adjust_selected_count(&mut self, delta: i64) {
        if self.focus_panel != FocusPanel::Units {
            return;
        }
        let Some((pool, id, count)) = self
            .get_selected_unit()
            .map(|(pool, unit)| (pool, unit.id, unit.count))
        else {
            return;
        };
        self.project.set_unit_count(pool, id, i64::from(count) + delta);
        self.refresh();
    }

    fn start_input(&mut self, field: OverrideField) {
        if self.focus_panel != FocusPanel::Items {
            return;
        }
        let Some(item) = self.get_selected_item() else {
            return;
        };
        let current = match field {
            OverrideField::Quantity => item.manual_quantity.then_some(item.quantity),
            OverrideField::Price => item.manual_price.then_some(item.unit_price),
        };
        self.input = Some(ValueInput {
            item: item.name.clone(),
            field,
            buffer: current.map(|v| v.to_string()).unwrap_or_default(),
        });
    }

    /// Stores the typed value as an override. Negative input cannot be typed;
    /// anything unparseable counts as 0.
    fn commit_input(&mut self) {
        let Some(input) = self.input.take() else {
            return;
        };
        let raw = input.buffer.replace(',', ".");
        let value = (!raw.trim().is_empty()).then(|| parse_number(&raw));

        match input.field {
            OverrideField::Quantity => self.project.overrides.set_quantity(&input.item, value),
            OverrideField::Price => self.project.overrides.set_price(&input.item, value),
        }
        self.status = Some(match value {
            Some(v) => format!("{}: manual {} {v}", input.item, input.field.label()),
            None => format!("{}: automatic {}", input.item, input.field.label()),
        });
        self.refresh();
    }

    fn clear_selected_override(&mut self) {
        if self.focus_panel != FocusPanel::Items {
            return;
        }
        let Some(name) = self.get_selected_item().map(|i| i.name.clone()) else {
            return;
        };
        self.project.overrides.clear(&name);
        self.status = Some(format!("{name}: back to automatic"));
        self.refresh();
    }

    /// Both pools in display order: unit types first, then floor plans.
    #[must_use]
    pub fn get_unit_entries(&self) -> Vec<(Pool, &SpatialUnit)> {
        self.project
            .units
            .iter()
            .map(|u| (Pool::Architectural, u))
            .chain(self.project.structural_units.iter().map(|u| (Pool::Structural, u)))
            .collect()
    }

    #[must_use]
    pub fn get_selected_unit(&self) -> Option<(Pool, &SpatialUnit)> {
        self.get_unit_entries().get(self.selected_unit).copied()
    }

    #[must_use]
    pub fn get_unit_takeoff(&self) -> Option<UnitTakeoff> {
        self.get_selected_unit()
            .map(|(_, unit)| compute_unit(unit, &self.project.catalog, &self.project.building))
    }

    #[must_use]
    pub fn get_selected_category(&self) -> Option<&CategoryCost> {
        self.report.categories.get(self.selected_category)
    }

    #[must_use]
    pub fn get_selected_item(&self) -> Option<&ResolvedItem> {
        self.get_selected_category()
            .and_then(|c| c.items.get(self.selected_item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StructuralMode;
    use pretty_assertions::assert_eq;

    fn app_with_units() -> App {
        let mut project = Project::default();
        project.add_unit(Pool::Architectural);
        project.add_unit(Pool::Structural);
        App::new(project)
    }

    #[test]
    fn test_toggle_mode_commits_through_session() {
        let mut app = app_with_units();
        app.handle_dashboard_keys(KeyCode::Down);
        app.handle_dashboard_keys(KeyCode::Char('m'));

        assert_eq!(app.project.structural_units[0].mode, StructuralMode::Detailed);
        assert_eq!(app.project.units[0].mode, StructuralMode::Global);
        assert_eq!(app.status.as_deref(), Some("Floor Plan 1: Detailed mode"));
    }

    #[test]
    fn test_count_keys_refresh_report() {
        let mut app = app_with_units();
        app.project.units[0].rooms.push(crate::model::Room {
            id: 1,
            name: "Salon".to_string(),
            outline: crate::model::Outline::Manual {
                area_m2: 10.0,
                perimeter_m: None,
            },
            properties: crate::model::RoomProperties::default(),
        });
        app.refresh();
        let before = app.report.fitout_subtotal;

        app.handle_dashboard_keys(KeyCode::Char('+'));
        assert_eq!(app.project.units[0].count, 2);
        assert!(app.report.fitout_subtotal > before);

        app.handle_dashboard_keys(KeyCode::Char('-'));
        app.handle_dashboard_keys(KeyCode::Char('-'));
        app.handle_dashboard_keys(KeyCode::Char('-'));
        assert_eq!(app.project.units[0].count, 0);
    }

    #[test]
    fn test_clear_override_from_items_panel() {
        let mut app = app_with_units();
        let first = app.report.categories[0].items[0].name.clone();
        app.project.overrides.set_quantity(&first, Some(3.0));
        app.refresh();
        assert!(app.report.categories[0].items[0].manual_quantity);

        app.handle_dashboard_keys(KeyCode::Right);
        app.handle_dashboard_keys(KeyCode::Right);
        app.handle_dashboard_keys(KeyCode::Char('c'));
        assert!(app.project.overrides.is_empty());
        assert!(!app.report.categories[0].items[0].manual_quantity);
    }

    #[test]
    fn test_detail_view_navigation() {
        let mut app = app_with_units();
        app.handle_dashboard_keys(KeyCode::Enter);
        assert_eq!(app.view, View::UnitDetail);

        app.handle_detail_keys(KeyCode::Down);
        assert_eq!(app.stats_scroll_offset, 1);
        app.handle_detail_keys(KeyCode::Esc);
        assert_eq!(app.view, View::Dashboard);
        assert_eq!(app.stats_scroll_offset, 0);

        app.handle_dashboard_keys(KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    fn focus_items(app: &mut App) {
        app.handle_dashboard_keys(KeyCode::Right);
        app.handle_dashboard_keys(KeyCode::Right);
    }

    #[test]
    fn test_typed_quantity_and_price_become_overrides() {
        let mut app = app_with_units();
        focus_items(&mut app);
        let name = app.get_selected_item().unwrap().name.clone();

        app.handle_dashboard_keys(KeyCode::Char('e'));
        for c in ['1', '2', ',', '5', 'x', '-'] {
            app.handle_input_keys(KeyCode::Char(c));
        }
        app.handle_input_keys(KeyCode::Enter);
        assert!(app.input.is_none());
        assert_eq!(app.project.overrides.get(&name).manual_quantity, Some(12.5));

        app.handle_dashboard_keys(KeyCode::Char('p'));
        for c in "300".chars() {
            app.handle_input_keys(KeyCode::Char(c));
        }
        app.handle_input_keys(KeyCode::Enter);

        let item = app.get_selected_item().unwrap();
        assert!(item.manual_quantity && item.manual_price);
        assert_eq!(item.total, 12.5 * 300.0);
    }

    #[test]
    fn test_empty_input_clears_and_escape_cancels() {
        let mut app = app_with_units();
        focus_items(&mut app);
        let name = app.get_selected_item().unwrap().name.clone();
        app.project.overrides.set_quantity(&name, Some(4.0));
        app.refresh();

        app.handle_dashboard_keys(KeyCode::Char('e'));
        assert_eq!(app.input.as_ref().unwrap().buffer, "4");
        app.handle_input_keys(KeyCode::Char('9'));
        app.handle_input_keys(KeyCode::Esc);
        assert_eq!(app.project.overrides.get(&name).manual_quantity, Some(4.0));

        app.handle_dashboard_keys(KeyCode::Char('e'));
        app.handle_input_keys(KeyCode::Backspace);
        app.handle_input_keys(KeyCode::Enter);
        assert!(app.project.overrides.is_empty());
    }

    #[test]
    fn test_category_mode_key_switches_structure_pricing() {
        let mut app = app_with_units();
        app.handle_dashboard_keys(KeyCode::Right);
        let global = app.report.structural_subtotal;
        assert!(global > 0.0);

        app.handle_dashboard_keys(KeyCode::Char('m'));
        assert_eq!(app.project.category_modes.get("kaba_insaat"), StructuralMode::Detailed);
        assert_eq!(app.report.categories[0].mode, StructuralMode::Detailed);
        // Empty floor plans carry no drawn structure.
        assert_eq!(app.report.structural_subtotal, 0.0);
        assert_eq!(app.project.units[0].mode, StructuralMode::Global);

        app.handle_dashboard_keys(KeyCode::Down);
        app.handle_dashboard_keys(KeyCode::Char('m'));
        assert_eq!(app.project.category_modes, {
            let mut modes = crate::model::CategoryModes::default();
            modes.set("kaba_insaat", StructuralMode::Detailed);
            modes
        });
    }

    #[test]
    fn test_pool_mode_key_switches_whole_pool() {
        let mut app = app_with_units();
        app.project.add_unit(Pool::Architectural);
        app.handle_dashboard_keys(KeyCode::Char('M'));

        assert_eq!(app.project.pool_mode(Pool::Architectural), Some(StructuralMode::Detailed));
        assert_eq!(app.project.pool_mode(Pool::Structural), Some(StructuralMode::Global));
        assert_eq!(app.status.as_deref(), Some("Unit types: all Detailed mode"));
    }
}
