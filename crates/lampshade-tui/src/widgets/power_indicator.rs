//! Power indicator — ●/○/◌/◐ with color mapping.

use ratatui::style::Style;
use ratatui::text::Span;

use lampshade_core::PowerState;

use crate::theme;

/// Styled dot for a light's power state. `pending` marks an unconfirmed toggle.
pub fn power_span(state: PowerState, pending: bool) -> Span<'static> {
    let color = match (state, pending) {
        (_, true) => theme::ELECTRIC_YELLOW,
        (PowerState::On, false) => theme::AMBER,
        (PowerState::Off, false) => theme::BORDER_GRAY,
        (PowerState::Other, false) => theme::ERROR_RED,
    };
    Span::styled(power_char(state, pending), Style::default().fg(color))
}

/// The dot character without styling.
pub fn power_char(state: PowerState, pending: bool) -> &'static str {
    if pending {
        return "◐";
    }
    match state {
        PowerState::On => "●",
        PowerState::Off => "○",
        PowerState::Other => "◌",
    }
}
