// ── View state ──
//
// The lights currently on screen and the selected row. A single owner
// (the UI loop) mutates this; background tasks only ever send it new data.
//
// Invariant: `selected.is_some()` iff `!lights.is_empty()`, and a selected
// index is always `< lights.len()`.

use crate::model::Device;
use crate::toggle::ToggleRequest;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    lights: Vec<Device>,
    selected: Option<usize>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a view with the first light selected.
    pub fn from_lights(lights: Vec<Device>) -> Self {
        let mut view = Self::new();
        view.replace(lights);
        view
    }

    pub fn lights(&self) -> &[Device] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_light(&self) -> Option<&Device> {
        self.selected.and_then(|idx| self.lights.get(idx))
    }

    pub fn position(&self, entity_id: &str) -> Option<usize> {
        self.lights.iter().position(|d| d.entity_id == entity_id)
    }

    // ── Replacement ──────────────────────────────────────────────────

    /// Replace the whole list with a fresh poll result.
    ///
    /// The selection follows the previously selected entity id when it is
    /// still present. Otherwise the previous ordinal is kept, clamped to the
    /// new length. An empty list clears the selection.
    pub fn replace(&mut self, lights: Vec<Device>) {
        let previous_id = self.selected_light().map(|d| d.entity_id.clone());
        let previous_idx = self.selected;

        self.lights = lights;

        let Some(last) = self.lights.len().checked_sub(1) else {
            self.selected = None;
            return;
        };

        self.selected = previous_id
            .and_then(|id| self.position(&id))
            .or_else(|| previous_idx.map(|idx| idx.min(last)))
            .or(Some(0));
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Select `idx`, clamped to the list. Returns `true` if the selection
    /// changed.
    pub fn select(&mut self, idx: usize) -> bool {
        let Some(last) = self.lights.len().checked_sub(1) else {
            return false;
        };
        let next = Some(idx.min(last));
        let changed = next != self.selected;
        self.selected = next;
        changed
    }

    /// Move the selection by `delta` rows, clamped at both ends.
    pub fn move_selection(&mut self, delta: isize) -> bool {
        let current = self.selected.unwrap_or(0);
        let next = if delta.is_negative() {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        self.select(next)
    }

    pub fn select_first(&mut self) -> bool {
        self.select(0)
    }

    pub fn select_last(&mut self) -> bool {
        self.select(usize::MAX)
    }

    // ── Toggle support ───────────────────────────────────────────────

    /// Plan a toggle for the selected light, if any.
    pub fn plan_toggle(&self) -> Option<ToggleRequest> {
        self.selected_light().map(ToggleRequest::for_device)
    }

    /// Write `state` into the stored light with `entity_id`.
    ///
    /// Writes through to the element in `lights`, not a copy. Returns
    /// `false` if the light is no longer displayed.
    pub fn apply_power(&mut self, entity_id: &str, state: &str) -> bool {
        match self.lights.iter_mut().find(|d| d.entity_id == entity_id) {
            Some(device) => {
                state.clone_into(&mut device.state);
                true
            }
            None => false,
        }
    }

    /// Apply the optimistic result of `req`.
    pub fn apply_toggle(&mut self, req: &ToggleRequest) -> bool {
        self.apply_power(&req.entity_id, req.target.as_state())
    }

    /// Undo an optimistic toggle after the hub rejected it.
    ///
    /// Only restores when the light still shows the optimistic value; if a
    /// refresh already replaced it, the hub's answer wins.
    pub fn revert_toggle(&mut self, req: &ToggleRequest) -> bool {
        let optimistic = req.target.as_state();
        match self
            .lights
            .iter_mut()
            .find(|d| d.entity_id == req.entity_id && d.state == optimistic)
        {
            Some(device) => {
                req.previous_state.clone_into(&mut device.state);
                true
            }
            None => false,
        }
    }
}
