//! Lights screen — selectable table of lights with a detail panel.
//!
//! Owns the [`ViewState`]. Background tasks never touch it directly; fresh
//! poll results and toggle outcomes arrive as actions through `update`.

use std::collections::{HashMap, HashSet};

use chrono::Local;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};
use tracing::debug;

use lampshade_core::{Device, ViewState};

use crate::action::Action;
use crate::component::Component;
use crate::theme;
use crate::widgets::power_indicator;

const PLACEHOLDER: &str = "─";

/// The attribute fields shown under the table for the selected light.
///
/// Recomputed whenever the selection or the list changes, so rendering never
/// has to look the selection up again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFields {
    pub device_name: String,
    pub manufacturer: String,
    pub device_model: String,
    pub model_name: String,
    pub entity_id: String,
    pub last_changed: String,
}

impl DetailFields {
    fn from_device(device: &Device) -> Self {
        let attrs = &device.attributes;
        let or_placeholder =
            |v: Option<&String>| v.map_or_else(|| PLACEHOLDER.to_owned(), Clone::clone);

        Self {
            device_name: device.display_name().to_owned(),
            manufacturer: or_placeholder(attrs.manufacturer.as_ref()),
            device_model: or_placeholder(attrs.device_model.as_ref()),
            model_name: or_placeholder(attrs.model_name.as_ref()),
            entity_id: device.entity_id.clone(),
            last_changed: device.last_changed.map_or_else(
                || PLACEHOLDER.to_owned(),
                |ts| {
                    ts.with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string()
                },
            ),
        }
    }
}

pub struct LightsScreen {
    view: ViewState,
    detail: DetailFields,
    /// `false` until the first poll result arrives.
    loaded: bool,
    /// Lights with a toggle sent to the hub but not yet answered.
    pending: HashSet<String>,
    /// Last toggle failure per light, shown in the detail panel.
    toggle_errors: HashMap<String, String>,
}

impl LightsScreen {
    pub fn new() -> Self {
        Self {
            view: ViewState::new(),
            detail: DetailFields::default(),
            loaded: false,
            pending: HashSet::new(),
            toggle_errors: HashMap::new(),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn detail(&self) -> &DetailFields {
        &self.detail
    }

    pub fn toggle_error(&self, entity_id: &str) -> Option<&str> {
        self.toggle_errors.get(entity_id).map(String::as_str)
    }

    fn on_selection_changed(&mut self) {
        self.detail = self
            .view
            .selected_light()
            .map(DetailFields::from_device)
            .unwrap_or_default();
    }

    fn replace_lights(&mut self, lights: Vec<Device>) {
        self.view.replace(lights);
        self.loaded = true;
        let view = &self.view;
        self.toggle_errors
            .retain(|id, _| view.position(id).is_some());
        self.on_selection_changed();
    }

    /// Optimistically flip the selected light and hand the request off.
    fn activate_selected(&mut self) -> Option<Action> {
        let req = self.view.plan_toggle()?;
        if self.pending.contains(&req.entity_id) {
            debug!(entity_id = %req.entity_id, "toggle already in flight");
            return None;
        }
        self.view.apply_toggle(&req);
        self.pending.insert(req.entity_id.clone());
        self.toggle_errors.remove(&req.entity_id);
        Some(Action::ToggleRequested(req))
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" Lights ({}) ", self.view.len());
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Min(1),    // table
            Constraint::Length(1), // hints
        ])
        .split(inner);

        if self.view.is_empty() {
            let message = if self.loaded {
                "No lights reported by the hub"
            } else {
                "Waiting for the hub…"
            };
            let empty = Paragraph::new(vec![Line::from(""), Line::from(message)])
                .style(theme::key_hint())
                .alignment(Alignment::Center);
            frame.render_widget(empty, layout[0]);
        } else {
            self.render_rows(frame, layout[0]);
        }

        let hints = Line::from(vec![
            Span::styled(" j/k ", theme::key_hint_key()),
            Span::styled("navigate  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("toggle  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh  ", theme::key_hint()),
            Span::styled("q ", theme::key_hint_key()),
            Span::styled("quit", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn render_rows(&self, frame: &mut Frame, area: Rect) {
        let header = Row::new(vec![
            Cell::from("Friendly Name").style(theme::table_header()),
            Cell::from("State").style(theme::table_header()),
            Cell::from("Model Name").style(theme::table_header()),
        ]);

        let selected = self.view.selected();
        let rows: Vec<Row> = self
            .view
            .lights()
            .iter()
            .enumerate()
            .map(|(i, light)| {
                let prefix = if Some(i) == selected { "▸ " } else { "  " };
                let pending = self.pending.contains(&light.entity_id);
                let state = Line::from(vec![
                    power_indicator::power_span(light.power(), pending),
                    Span::raw(format!(" {}", light.state)),
                ]);
                let model = light
                    .attributes
                    .model_name
                    .as_deref()
                    .unwrap_or(PLACEHOLDER);

                Row::new(vec![
                    Cell::from(format!("{prefix}{}", light.display_name())),
                    Cell::from(state),
                    Cell::from(model.to_owned()),
                ])
                .style(theme::table_row())
            })
            .collect();

        let widths = [
            Constraint::Min(20),
            Constraint::Length(14),
            Constraint::Min(16),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(theme::table_selected());

        let mut state = TableState::default().with_selected(selected);
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Details ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.view.selected().is_none() {
            return;
        }

        let field = |label: &'static str, value: &str| {
            Line::from(vec![
                Span::styled(format!("  {label:<15}"), theme::label()),
                Span::styled(value.to_owned(), theme::value()),
            ])
        };

        let d = &self.detail;
        let mut lines = vec![
            field("Device Name", &d.device_name),
            field("Manufacturer", &d.manufacturer),
            field("Model Name", &d.model_name),
            field("Device Model", &d.device_model),
            field("Entity", &d.entity_id),
            field("Last Changed", &d.last_changed),
        ];
        if let Some(err) = self.toggle_errors.get(&d.entity_id) {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<15}", "Toggle Failed"), theme::label()),
                Span::styled(err.clone(), Style::default().fg(theme::ERROR_RED)),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Default for LightsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for LightsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let changed = match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.view.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.view.move_selection(-1),
            KeyCode::Char('g') | KeyCode::Home => self.view.select_first(),
            KeyCode::Char('G') | KeyCode::End => self.view.select_last(),
            KeyCode::Enter | KeyCode::Char(' ') => return Ok(self.activate_selected()),
            _ => false,
        };
        if changed {
            self.on_selection_changed();
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LightsLoaded(lights) => {
                self.replace_lights(lights.to_vec());
            }
            Action::ToggleCompleted(req) => {
                self.pending.remove(&req.entity_id);
            }
            Action::ToggleFailed { request, message } => {
                self.pending.remove(&request.entity_id);
                self.view.revert_toggle(request);
                self.toggle_errors
                    .insert(request.entity_id.clone(), message.clone());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let layout = Layout::vertical([
            Constraint::Min(5),    // table
            Constraint::Length(9), // detail
        ])
        .split(area);

        self.render_table(frame, layout[0]);
        self.render_detail(frame, layout[1]);
    }

    fn id(&self) -> &str {
        "Lights"
    }
}
