//! Application core — event loop, action dispatch, and hub task spawning.

use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use lampshade_core::{ErrorKind, Hub, ToggleRequest};

use crate::action::{Action, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::refresh::spawn_refresh_loop;
use crate::screens::lights::LightsScreen;
use crate::theme;
use crate::tui::Tui;

/// Housekeeping cadence: refresh-age clock and message expiry.
const TICK_RATE: Duration = Duration::from_millis(500);

/// How long a status-line message stays up.
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Hub reachability as seen by the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    /// Transport failure on the last poll.
    Unreachable,
    /// The hub answered, but with an error status or unreadable body.
    Degraded,
}

/// What woke the event loop.
enum Wake {
    Input(Event),
    Action(Action),
}

/// `Ctrl+C` or `Shift+Alt+↑`.
fn is_hard_quit(key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('c') => key.modifiers == KeyModifiers::CONTROL,
        KeyCode::Up => key
            .modifiers
            .contains(KeyModifiers::SHIFT | KeyModifiers::ALT),
        _ => false,
    }
}

/// Top-level application state and event loop.
pub struct App {
    hub: Hub,
    screen: LightsScreen,
    running: bool,
    connection_status: ConnectionStatus,
    /// When the last successful poll landed.
    last_refresh: Option<Instant>,
    /// At most one fetch runs at a time; extra requests are dropped.
    refresh_in_flight: bool,
    help_visible: bool,
    notification: Option<(Notification, Instant)>,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    cancel: CancellationToken,
}

impl App {
    pub fn new(hub: Hub) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        Self {
            hub,
            screen: LightsScreen::new(),
            running: true,
            connection_status: ConnectionStatus::default(),
            last_refresh: None,
            refresh_in_flight: false,
            help_visible: false,
            notification: None,
            action_tx,
            action_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::enter()?;
        debug!(screen = self.screen.id(), "screen mounted");

        let _refresh = spawn_refresh_loop(
            self.hub.config().poll_interval,
            self.action_tx.clone(),
            self.cancel.clone(),
        );
        // Initial load; the timer only fires after one full period
        self.action_tx.send(Action::RefreshRequested)?;

        let mut events = EventReader::new(TICK_RATE);

        info!(url = %self.hub.config().base_url, "TUI event loop started");
        tui.draw(|frame| self.render(frame))?;

        while self.running {
            let wake = tokio::select! {
                event = events.next() => event.map(Wake::Input),
                action = self.action_rx.recv() => action.map(Wake::Action),
            };

            match wake {
                Some(Wake::Input(event)) => self.handle_event(event)?,
                Some(Wake::Action(action)) => self.process_action(&action)?,
                None => break,
            }

            // Follow-ups queued while handling the wakeup
            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;
            }

            if self.running {
                tui.draw(|frame| self.render(frame))?;
            }
        }

        self.cancel.cancel();
        drop(events);
        drop(tui);
        info!("TUI event loop ended");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        let action = match event {
            Event::Key(key) => self.handle_key_event(key)?,
            Event::Tick => Some(Action::Tick),
            Event::Resize => None,
        };
        if let Some(action) = action {
            self.process_action(&action)?;
        }
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here; table
    /// keys go to the lights screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        // Hard quit works even over the help overlay
        if is_hard_quit(key) {
            return Ok(Some(Action::Quit));
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            });
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q') | KeyCode::Esc) => {
                return Ok(Some(Action::Quit));
            }
            (KeyModifiers::NONE, KeyCode::Char('r')) => {
                return Ok(Some(Action::RefreshRequested));
            }
            // '?' arrives with SHIFT on most layouts
            (_, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            _ => {}
        }

        self.screen.handle_key_event(key)
    }

    /// Process a single action — update app state and propagate to the screen.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
                self.cancel.cancel();
            }

            Action::Tick => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|(_, shown)| shown.elapsed() >= NOTIFICATION_TTL)
                {
                    self.notification = None;
                }
            }

            Action::RefreshRequested => self.start_refresh(),

            Action::LightsLoaded(lights) => {
                self.refresh_in_flight = false;
                self.last_refresh = Some(Instant::now());
                let recovered = matches!(
                    self.connection_status,
                    ConnectionStatus::Unreachable | ConnectionStatus::Degraded
                );
                self.connection_status = ConnectionStatus::Connected;
                if recovered {
                    self.action_tx
                        .send(Action::Notify(Notification::info("Hub reachable again")))?;
                }
                debug!(count = lights.len(), "lights loaded");
                self.forward(action)?;
            }

            Action::RefreshFailed { kind, message } => {
                self.refresh_in_flight = false;
                self.connection_status = match kind {
                    ErrorKind::Connection => ConnectionStatus::Unreachable,
                    _ => ConnectionStatus::Degraded,
                };
                self.action_tx
                    .send(Action::Notify(Notification::error(message.clone())))?;
            }

            Action::ToggleRequested(req) => self.start_toggle(req.clone()),

            Action::ToggleCompleted(req) => {
                let name = self.light_name(&req.entity_id);
                self.action_tx.send(Action::Notify(Notification::success(format!(
                    "{name} turned {}",
                    req.target
                ))))?;
                self.forward(action)?;
            }

            Action::ToggleFailed { request, message } => {
                let name = self.light_name(&request.entity_id);
                self.action_tx.send(Action::Notify(Notification::error(format!(
                    "Could not switch {name}: {message}"
                ))))?;
                self.forward(action)?;
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::Notify(notification) => {
                self.notification = Some((notification.clone(), Instant::now()));
            }

        }

        Ok(())
    }

    fn forward(&mut self, action: &Action) -> Result<()> {
        if let Some(follow_up) = self.screen.update(action)? {
            self.action_tx.send(follow_up)?;
        }
        Ok(())
    }

    fn light_name(&self, entity_id: &str) -> String {
        let view = self.screen.view();
        view.position(entity_id)
            .and_then(|idx| view.lights().get(idx))
            .map_or_else(|| entity_id.to_owned(), |d| d.display_name().to_owned())
    }

    // ── Hub tasks ───────────────────────────────────────────────────

    fn start_refresh(&mut self) {
        if self.refresh_in_flight {
            debug!("refresh already in flight, skipping");
            return;
        }
        self.refresh_in_flight = true;

        let hub = self.hub.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let action = match hub.fetch_lights().await {
                Ok(lights) => Action::LightsLoaded(Arc::new(lights)),
                Err(e) => {
                    warn!(error = %e, transient = e.is_transient(), "refresh failed");
                    Action::RefreshFailed {
                        kind: e.kind(),
                        message: e.to_string(),
                    }
                }
            };
            // Receiver is gone only during shutdown
            let _ = tx.send(action);
        });
    }

    fn start_toggle(&self, request: ToggleRequest) {
        let hub = self.hub.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let action = match hub.set_power(&request).await {
                Ok(()) => Action::ToggleCompleted(request),
                Err(e) => {
                    warn!(entity_id = %request.entity_id, error = %e, "toggle failed");
                    Action::ToggleFailed {
                        request,
                        message: e.to_string(),
                    }
                }
            };
            let _ = tx.send(action);
        });
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        self.screen.render(frame, layout[0]);
        self.render_status_bar(frame, layout[1]);

        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    /// Connection indicator, refresh age, and either the current message or key hints.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let connection_indicator = match self.connection_status {
            ConnectionStatus::Connected => {
                Span::styled("● connected", Style::default().fg(theme::SUCCESS_GREEN))
            }
            ConnectionStatus::Connecting => {
                Span::styled("◐ connecting", Style::default().fg(theme::ELECTRIC_YELLOW))
            }
            ConnectionStatus::Unreachable => {
                Span::styled("○ unreachable", Style::default().fg(theme::ERROR_RED))
            }
            ConnectionStatus::Degraded => {
                Span::styled("◐ hub error", Style::default().fg(theme::ERROR_RED))
            }
        };

        let age = self.last_refresh.map_or_else(
            || "never".to_owned(),
            |at| {
                let secs = Duration::from_secs(at.elapsed().as_secs());
                format!("{} ago", humantime::format_duration(secs))
            },
        );

        let mut spans = vec![
            Span::raw(" "),
            connection_indicator,
            Span::styled(" │ refreshed ", theme::key_hint()),
            Span::styled(age, theme::label()),
            Span::styled(" │ ", theme::key_hint()),
        ];

        match &self.notification {
            Some((notification, _)) => {
                let color = match notification.level {
                    NotificationLevel::Success => theme::SUCCESS_GREEN,
                    NotificationLevel::Info => theme::NEON_CYAN,
                    NotificationLevel::Error => theme::ERROR_RED,
                };
                spans.push(Span::styled(
                    notification.message.clone(),
                    Style::default().fg(color),
                ));
            }
            None => spans.push(Span::styled("? help  q quit", theme::key_hint())),
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    /// Render the help overlay centered on screen.
    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_width = 44u16.min(area.width.saturating_sub(4));
        let help_height = 14u16.min(area.height.saturating_sub(2));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let entry = |keys: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {keys:<14}"), theme::key_hint_key()),
                Span::styled(what, theme::key_hint()),
            ])
        };

        let help_text = vec![
            Line::from(""),
            entry("j/k ↑/↓", "Move up/down"),
            entry("g/G", "Top / bottom"),
            entry("Enter/Space", "Toggle light"),
            entry("r", "Refresh now"),
            entry("?", "This help"),
            entry("q Esc", "Quit"),
            entry("Shift+Alt+↑", "Quit"),
            entry("Ctrl+c", "Quit"),
            Line::from(""),
            Line::from(Span::styled("     Esc or ? to close", theme::key_hint())),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lampshade_core::{Device, HubConfig, PowerTarget};
    use pretty_assertions::assert_eq;
    use ratatui::{Terminal, backend::TestBackend};

    fn app() -> App {
        // Nothing listens on a just-released port, so fetches fail fast
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let url = lampshade_config::parse_base_url(&format!("http://127.0.0.1:{port}")).unwrap();
        let config = HubConfig::new(url).with_timeout(Duration::from_secs(2));
        App::new(Hub::new(config).unwrap())
    }

    fn key(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    /// Process everything the app queued for itself.
    fn drain(app: &mut App) {
        while let Ok(action) = app.action_rx.try_recv() {
            app.process_action(&action).unwrap();
        }
    }

    fn draw(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    fn loaded(lights: Vec<Device>) -> Action {
        Action::LightsLoaded(Arc::new(lights))
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        for (code, mods) in [
            (KeyCode::Char('q'), KeyModifiers::NONE),
            (KeyCode::Esc, KeyModifiers::NONE),
            (KeyCode::Char('c'), KeyModifiers::CONTROL),
            (KeyCode::Up, KeyModifiers::SHIFT | KeyModifiers::ALT),
        ] {
            let action = app.handle_key_event(key(code, mods)).unwrap();
            assert!(matches!(action, Some(Action::Quit)), "{code:?} {mods:?}");
        }
    }

    #[test]
    fn plain_up_moves_instead_of_quitting() {
        let mut app = app();
        app.process_action(&loaded(vec![
            Device::new("light.a", "on"),
            Device::new("light.b", "on"),
        ]))
        .unwrap();
        app.handle_key_event(key(KeyCode::Down, KeyModifiers::NONE))
            .unwrap();

        let action = app
            .handle_key_event(key(KeyCode::Up, KeyModifiers::NONE))
            .unwrap();
        assert!(action.is_none());
        assert_eq!(app.screen.view().selected(), Some(0));
    }

    #[test]
    fn r_requests_refresh() {
        let mut app = app();
        let action = app
            .handle_key_event(key(KeyCode::Char('r'), KeyModifiers::NONE))
            .unwrap();
        assert!(matches!(action, Some(Action::RefreshRequested)));
    }

    #[test]
    fn esc_closes_help_before_quitting() {
        let mut app = app();
        let open = app
            .handle_key_event(key(KeyCode::Char('?'), KeyModifiers::SHIFT))
            .unwrap();
        assert!(matches!(open, Some(Action::ToggleHelp)));
        app.process_action(&Action::ToggleHelp).unwrap();
        assert!(draw(&app).contains("Keyboard Shortcuts"));

        let close = app
            .handle_key_event(key(KeyCode::Esc, KeyModifiers::NONE))
            .unwrap();
        assert!(matches!(close, Some(Action::ToggleHelp)));
    }

    #[test]
    fn hard_quit_keys_work_over_help() {
        let mut app = app();
        app.process_action(&Action::ToggleHelp).unwrap();

        for (code, mods) in [
            (KeyCode::Char('c'), KeyModifiers::CONTROL),
            (KeyCode::Up, KeyModifiers::SHIFT | KeyModifiers::ALT),
        ] {
            let action = app.handle_key_event(key(code, mods)).unwrap();
            assert!(matches!(action, Some(Action::Quit)), "{code:?} {mods:?}");
        }

        // Other keys stay swallowed by the overlay
        let action = app
            .handle_key_event(key(KeyCode::Char('r'), KeyModifiers::NONE))
            .unwrap();
        assert!(action.is_none());
    }

    #[test]
    fn quit_stops_loop_and_cancels_background_tasks() {
        let mut app = app();
        app.process_action(&Action::Quit).unwrap();
        assert!(!app.running);
        assert!(app.cancel.is_cancelled());
    }

    #[test]
    fn lights_loaded_marks_connected() {
        let mut app = app();
        app.refresh_in_flight = true;
        app.process_action(&loaded(vec![Device::new("light.a", "on")]))
            .unwrap();

        assert_eq!(app.connection_status, ConnectionStatus::Connected);
        assert!(!app.refresh_in_flight);
        assert!(app.last_refresh.is_some());
        assert_eq!(app.screen.view().len(), 1);
        assert!(draw(&app).contains("● connected"));
    }

    #[test]
    fn refresh_failure_is_reported_and_recoverable() {
        let mut app = app();
        app.refresh_in_flight = true;
        app.process_action(&Action::RefreshFailed {
            kind: ErrorKind::Connection,
            message: "Cannot reach hub".into(),
        })
        .unwrap();
        drain(&mut app);

        assert_eq!(app.connection_status, ConnectionStatus::Unreachable);
        assert!(!app.refresh_in_flight);
        let text = draw(&app);
        assert!(text.contains("unreachable"));
        assert!(text.contains("Cannot reach hub"));

        app.process_action(&loaded(Vec::new())).unwrap();
        drain(&mut app);
        assert_eq!(app.connection_status, ConnectionStatus::Connected);
        let (notification, _) = app.notification.clone().unwrap();
        assert_eq!(notification.level, NotificationLevel::Info);
    }

    #[test]
    fn hub_error_is_degraded_not_unreachable() {
        let mut app = app();
        app.process_action(&Action::RefreshFailed {
            kind: ErrorKind::Decode,
            message: "bad json".into(),
        })
        .unwrap();
        assert_eq!(app.connection_status, ConnectionStatus::Degraded);
    }

    #[test]
    fn toggle_failure_reverts_and_notifies() {
        let mut app = app();
        let mut kitchen = Device::new("light.kitchen", "on");
        kitchen.attributes.friendly_name = Some("Kitchen".into());
        app.process_action(&loaded(vec![kitchen])).unwrap();

        let Some(Action::ToggleRequested(request)) = app
            .handle_key_event(key(KeyCode::Enter, KeyModifiers::NONE))
            .unwrap()
        else {
            panic!("expected toggle request");
        };
        assert_eq!(request.target, PowerTarget::Off);
        assert_eq!(app.screen.view().lights()[0].state, "off");

        app.process_action(&Action::ToggleFailed {
            request,
            message: "Hub returned HTTP 500: boom".into(),
        })
        .unwrap();
        drain(&mut app);

        assert_eq!(app.screen.view().lights()[0].state, "on");
        let (notification, _) = app.notification.clone().unwrap();
        assert_eq!(notification.level, NotificationLevel::Error);
        assert_eq!(
            notification.message,
            "Could not switch Kitchen: Hub returned HTTP 500: boom"
        );
    }

    #[test]
    fn toggle_success_notifies() {
        let mut app = app();
        app.process_action(&loaded(vec![Device::new("light.a", "off")]))
            .unwrap();
        let req = ToggleRequest::for_device(&app.screen.view().lights()[0]);

        app.process_action(&Action::ToggleCompleted(req)).unwrap();
        drain(&mut app);

        let (notification, _) = app.notification.clone().unwrap();
        assert_eq!(notification.message, "light.a turned on");
    }

    #[test]
    fn notification_expires_on_tick() {
        let mut app = app();
        let shown = Instant::now()
            .checked_sub(NOTIFICATION_TTL * 2)
            .unwrap_or_else(Instant::now);
        app.notification = Some((Notification::success("done"), shown));

        app.process_action(&Action::Tick).unwrap();
        assert!(app.notification.is_none());
    }

    #[test]
    fn fresh_notification_survives_tick() {
        let mut app = app();
        app.process_action(&Action::Notify(Notification::success("done")))
            .unwrap();
        app.process_action(&Action::Tick).unwrap();
        assert!(app.notification.is_some());
    }

    #[test]
    fn input_events_are_handled_in_place() {
        let mut app = app();
        let shown = Instant::now()
            .checked_sub(NOTIFICATION_TTL * 2)
            .unwrap_or_else(Instant::now);
        app.notification = Some((Notification::success("done"), shown));

        app.handle_event(Event::Resize).unwrap();
        assert!(app.notification.is_some());
        assert!(app.action_rx.try_recv().is_err());

        app.handle_event(Event::Tick).unwrap();
        assert!(app.notification.is_none());

        app.handle_event(Event::Key(key(KeyCode::Char('q'), KeyModifiers::NONE)))
            .unwrap();
        assert!(!app.running);
    }

    #[tokio::test]
    async fn refresh_is_coalesced_and_reports_failure() {
        let mut app = app();
        app.process_action(&Action::RefreshRequested).unwrap();
        assert!(app.refresh_in_flight);
        // Second request while the first is running is dropped
        app.process_action(&Action::RefreshRequested).unwrap();

        let action = tokio::time::timeout(Duration::from_secs(10), app.action_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            action,
            Action::RefreshFailed {
                kind: ErrorKind::Connection,
                ..
            }
        ));

        // Only one fetch was spawned
        let extra = tokio::time::timeout(Duration::from_millis(500), app.action_rx.recv()).await;
        assert!(extra.is_err());
    }
}
