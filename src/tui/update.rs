//! Pure update function for the dashboard.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effect the runtime should execute.
//! Selection changes are *not* applied here — the runtime routes them
//! through the controller (normalize → persist → rebuild) and feeds the
//! result back as [`MatrixMsg::SelectionApplied`], so the stored state and
//! the rendered table can never diverge.
//!
//! **Design invariant:** this module performs zero I/O.

use super::input::{InputAction, InputContext, resolve_key};
use super::model::{MatrixCmd, MatrixModel, MatrixMsg, TooltipView};

/// Apply a message to the model and return the next command for the runtime.
pub fn update(model: &mut MatrixModel, msg: MatrixMsg) -> MatrixCmd {
    match msg {
        MatrixMsg::Key(key) => {
            let context = InputContext {
                picker_open: model.picker_open,
                filter_editing: model.filter_editing,
            };
            match resolve_key(&key, context) {
                Some(action) => apply_action(model, action),
                None => MatrixCmd::None,
            }
        }

        MatrixMsg::SelectionApplied { selection, table } => {
            // Wholesale replacement: no rows or columns of the previous
            // table survive a shrinking selection.
            model.table = table;
            model.sync_picker(&selection);
            model.clamp_cursors();
            MatrixCmd::None
        }

        MatrixMsg::TooltipLoaded { service, body } => {
            model.tooltip = Some(TooltipView { service, body });
            MatrixCmd::None
        }
    }
}

#[allow(clippy::too_many_lines)]
fn apply_action(model: &mut MatrixModel, action: InputAction) -> MatrixCmd {
    match action {
        InputAction::Quit => MatrixCmd::Quit,

        InputAction::OpenPicker => {
            if !model.degraded {
                model.picker_open = true;
                model.picker_cursor = 0;
            }
            MatrixCmd::None
        }

        InputAction::ClosePicker => {
            model.picker_open = false;
            MatrixCmd::None
        }

        InputAction::CursorUp => {
            if model.picker_open {
                model.picker_cursor = model.picker_cursor.saturating_sub(1);
            } else {
                model.cursor_row = model.cursor_row.saturating_sub(1);
            }
            MatrixCmd::None
        }

        InputAction::CursorDown => {
            if model.picker_open {
                let last = model.visible_picker_indices().len().saturating_sub(1);
                model.picker_cursor = (model.picker_cursor + 1).min(last);
            } else {
                let last = model.visible_row_indices().len().saturating_sub(1);
                model.cursor_row = (model.cursor_row + 1).min(last);
            }
            MatrixCmd::None
        }

        InputAction::CursorLeft => {
            model.cursor_col = model.cursor_col.saturating_sub(1);
            MatrixCmd::None
        }

        InputAction::CursorRight => {
            let last = model.table.column_count().saturating_sub(1);
            model.cursor_col = (model.cursor_col + 1).min(last);
            MatrixCmd::None
        }

        InputAction::ToggleEntry => {
            let visible = model.visible_picker_indices();
            let Some(&entry_index) = visible.get(model.picker_cursor) else {
                return MatrixCmd::None;
            };
            model.picker_checked[entry_index] = !model.picker_checked[entry_index];
            MatrixCmd::ApplySelection(model.checked_names())
        }

        InputAction::SelectAll => {
            if model.degraded {
                return MatrixCmd::None;
            }
            model.picker_checked.fill(true);
            MatrixCmd::ApplySelection(model.checked_names())
        }

        InputAction::ClearAll => {
            if model.degraded {
                return MatrixCmd::None;
            }
            // An empty checked set normalizes to the fallback selection.
            model.picker_checked.fill(false);
            MatrixCmd::ApplySelection(Vec::new())
        }

        InputAction::ResetSelection => {
            if model.degraded {
                return MatrixCmd::None;
            }
            MatrixCmd::ApplySelection(Vec::new())
        }

        InputAction::BeginServiceFilter => {
            model.filter_editing = true;
            MatrixCmd::None
        }

        InputAction::EndServiceFilter => {
            model.filter_editing = false;
            MatrixCmd::None
        }

        InputAction::CancelServiceFilter => {
            model.filter_editing = false;
            model.service_filter.clear();
            model.clamp_cursors();
            MatrixCmd::None
        }

        InputAction::RequestTooltip => match model.cursor_service() {
            Some(service) => MatrixCmd::FetchTooltip(service.to_string()),
            None => MatrixCmd::None,
        },

        InputAction::ClearTooltip => {
            model.tooltip = None;
            MatrixCmd::None
        }

        InputAction::FilterChar(c) => {
            if model.picker_open {
                model.picker_filter.push(c);
                model.picker_cursor = 0;
            } else {
                model.service_filter.push(c);
                model.clamp_cursors();
            }
            MatrixCmd::None
        }

        InputAction::FilterBackspace => {
            if model.picker_open {
                model.picker_filter.pop();
                model.picker_cursor = 0;
            } else {
                model.service_filter.pop();
                model.clamp_cursors();
            }
            MatrixCmd::None
        }
    }
}
