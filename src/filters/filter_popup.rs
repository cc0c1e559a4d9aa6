//! Filter popup state
//!
//! The popup wraps one filter control (date range, text options, sorting...)
//! behind a trigger button. It tracks visibility, collects the control's
//! validation flags into error messages, and gates the save action on them.
//! Rendering is left to the caller through `FilterPopupView`.

use serde::Serialize;

const CLEAR_LABEL: &str = "Clear";
const SAVE_LABEL: &str = "Save";

/// A filter hosted inside a popup
pub trait FilterControl {
    /// Display name, e.g. "Committee"
    fn name(&self) -> &str;

    /// Reset the filter state
    fn clear(&mut self);

    /// Text representation of the current state, shown on the trigger
    fn text_rep(&self) -> String;

    /// Whether any selection is set
    fn is_active(&self) -> bool;

    /// No option is selected although one is required
    fn has_required_error(&self) -> bool {
        false
    }

    /// More options are selected than `limit` allows
    fn has_limit_error(&self) -> bool {
        false
    }

    /// Maximum number of selected options
    fn limit(&self) -> Option<usize> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupState {
    Closed,
    Open,
    /// Open, and the control changed since it was opened
    OpenWithPendingChanges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// An error is active; the popup stays open
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonView {
    pub label: &'static str,
    pub disabled: bool,
}

/// Everything needed to draw the popup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterPopupView {
    pub trigger_label: String,
    pub is_open: bool,
    pub errors: Vec<String>,
    /// Absent when the popup closes on change
    pub clear_button: Option<ButtonView>,
    pub save_button: Option<ButtonView>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterPopupOptions {
    /// Close (and save) as soon as the selection changes; hides the buttons
    pub close_on_change: bool,
}

/// Popup state machine around a filter control
pub struct FilterPopup<C: FilterControl> {
    control: C,
    state: PopupState,
    close_on_change: bool,
    on_save: Option<Box<dyn FnMut() + Send>>,
}

impl<C: FilterControl> FilterPopup<C> {
    pub fn new(control: C, options: FilterPopupOptions) -> Self {
        Self {
            control,
            state: PopupState::Closed,
            close_on_change: options.close_on_change,
            on_save: None,
        }
    }

    /// Callback run when the popup is saved without errors (builder pattern)
    pub fn with_on_save<F>(mut self, on_save: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_save = Some(Box::new(on_save));
        self
    }

    pub fn control(&self) -> &C {
        &self.control
    }

    /// Mutable access for applying a selection; follow with `on_change`
    pub fn control_mut(&mut self) -> &mut C {
        &mut self.control
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != PopupState::Closed
    }

    pub fn has_error(&self) -> bool {
        self.control.has_required_error() || self.control.has_limit_error()
    }

    /// Trigger button click
    pub fn toggle(&mut self) {
        self.state = match self.state {
            PopupState::Closed => PopupState::Open,
            PopupState::Open | PopupState::OpenWithPendingChanges => PopupState::Closed,
        };
    }

    /// Explicit close or a click outside the popup. Does not save.
    pub fn close(&mut self) {
        self.state = PopupState::Closed;
    }

    /// The control's selection changed
    pub fn on_change(&mut self) {
        if !self.is_open() {
            return;
        }
        if self.close_on_change {
            self.state = PopupState::Closed;
            self.notify_saved();
        } else {
            self.state = PopupState::OpenWithPendingChanges;
        }
    }

    /// Clear button: resets the control and keeps the popup open
    pub fn clear(&mut self) {
        self.control.clear();
        if self.is_open() {
            self.state = PopupState::OpenWithPendingChanges;
        }
    }

    /// Save button: closes the popup unless an error is active
    pub fn save(&mut self) -> SaveOutcome {
        if self.has_error() {
            log::debug!("Save blocked for filter '{}'", self.control.name());
            return SaveOutcome::Blocked;
        }
        self.state = PopupState::Closed;
        self.notify_saved();
        SaveOutcome::Saved
    }

    fn notify_saved(&mut self) {
        if self.has_error() {
            return;
        }
        if let Some(on_save) = self.on_save.as_mut() {
            on_save();
        }
    }

    /// Validation messages for the active errors, in display order
    pub fn errors(&self) -> Vec<String> {
        let name = self.control.name().to_lowercase();
        let mut errors = Vec::new();
        if self.control.has_required_error() {
            errors.push(format!("Please select at least one {}.", name));
        }
        if self.control.has_limit_error() {
            errors.push(match self.control.limit() {
                Some(limit) => format!("Please select only {} or fewer {}s.", limit, name),
                None => format!("Please select fewer {}s.", name),
            });
        }
        errors
    }

    pub fn view(&self) -> FilterPopupView {
        let (clear_button, save_button) = if self.close_on_change {
            (None, None)
        } else {
            (
                Some(ButtonView {
                    label: CLEAR_LABEL,
                    disabled: !self.control.is_active(),
                }),
                Some(ButtonView {
                    label: SAVE_LABEL,
                    disabled: self.has_error(),
                }),
            )
        };

        FilterPopupView {
            trigger_label: self.control.text_rep(),
            is_open: self.is_open(),
            errors: self.errors(),
            clear_button,
            save_button,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Multi-select over committee names
    #[derive(Default)]
    struct CommitteeFilter {
        selected: Vec<String>,
        required: bool,
        limit: Option<usize>,
        clear_calls: usize,
    }

    impl FilterControl for CommitteeFilter {
        fn name(&self) -> &str {
            "Committee"
        }

        fn clear(&mut self) {
            self.clear_calls += 1;
            self.selected.clear();
        }

        fn text_rep(&self) -> String {
            if self.selected.is_empty() {
                "All committees".to_string()
            } else {
                self.selected.join(", ")
            }
        }

        fn is_active(&self) -> bool {
            !self.selected.is_empty()
        }

        fn has_required_error(&self) -> bool {
            self.required && self.selected.is_empty()
        }

        fn has_limit_error(&self) -> bool {
            self.limit.is_some_and(|l| self.selected.len() > l)
        }

        fn limit(&self) -> Option<usize> {
            self.limit
        }
    }

    fn close_on_change() -> FilterPopupOptions {
        FilterPopupOptions {
            close_on_change: true,
        }
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let handle = count.clone();
        (count, move || {
            handle.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_required_error_blocks_save() {
        let control = CommitteeFilter {
            required: true,
            ..Default::default()
        };
        let (saves, on_save) = counter();
        let mut popup =
            FilterPopup::new(control, FilterPopupOptions::default()).with_on_save(on_save);
        popup.toggle();

        let view = popup.view();
        assert_eq!(view.errors, vec!["Please select at least one committee."]);
        assert!(view.save_button.unwrap().disabled);

        assert_eq!(popup.save(), SaveOutcome::Blocked);
        assert!(popup.is_open());
        assert_eq!(saves.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_errors_allows_save() {
        let control = CommitteeFilter {
            selected: vec!["Transportation".to_string()],
            ..Default::default()
        };
        let (saves, on_save) = counter();
        let mut popup =
            FilterPopup::new(control, FilterPopupOptions::default()).with_on_save(on_save);
        popup.toggle();

        let view = popup.view();
        assert!(view.errors.is_empty());
        assert!(!view.save_button.unwrap().disabled);
        assert_eq!(view.trigger_label, "Transportation");

        assert_eq!(popup.save(), SaveOutcome::Saved);
        assert_eq!(popup.state(), PopupState::Closed);
        assert_eq!(saves.load(Ordering::SeqCst), 1);
    }

    /// Control whose validation flags are set directly
    struct Flagged {
        required_error: bool,
        limit_error: bool,
    }

    impl FilterControl for Flagged {
        fn name(&self) -> &str {
            "Body"
        }
        fn clear(&mut self) {}
        fn text_rep(&self) -> String {
            "Bodies".to_string()
        }
        fn is_active(&self) -> bool {
            false
        }
        fn has_required_error(&self) -> bool {
            self.required_error
        }
        fn has_limit_error(&self) -> bool {
            self.limit_error
        }
        fn limit(&self) -> Option<usize> {
            Some(3)
        }
    }

    #[test]
    fn test_error_flag_combinations() {
        let cases = [
            (false, false, 0),
            (true, false, 1),
            (false, true, 1),
            (true, true, 2),
        ];
        for (required_error, limit_error, expected) in cases {
            let popup = FilterPopup::new(
                Flagged {
                    required_error,
                    limit_error,
                },
                FilterPopupOptions::default(),
            );
            let view = popup.view();
            assert_eq!(view.errors.len(), expected);
            assert_eq!(view.save_button.unwrap().disabled, expected > 0);
        }

        let both = FilterPopup::new(
            Flagged {
                required_error: true,
                limit_error: true,
            },
            FilterPopupOptions::default(),
        );
        assert_eq!(
            both.errors(),
            vec![
                "Please select at least one body.",
                "Please select only 3 or fewer bodys.",
            ]
        );
    }

    #[test]
    fn test_limit_error_from_selection_count() {
        let control = CommitteeFilter {
            selected: vec!["A".into(), "B".into(), "C".into()],
            limit: Some(2),
            ..Default::default()
        };
        let popup = FilterPopup::new(control, FilterPopupOptions::default());
        assert_eq!(
            popup.errors(),
            vec!["Please select only 2 or fewer committees."]
        );
    }

    #[test]
    fn test_clear_calls_control_once_and_stays_open() {
        let control = CommitteeFilter {
            selected: vec!["Arts".to_string()],
            ..Default::default()
        };
        let mut popup = FilterPopup::new(control, FilterPopupOptions::default());
        popup.toggle();

        popup.clear();

        assert_eq!(popup.control().clear_calls, 1);
        assert!(popup.is_open());
        assert_eq!(popup.state(), PopupState::OpenWithPendingChanges);
        assert!(popup.view().clear_button.unwrap().disabled);
    }

    #[test]
    fn test_state_transitions() {
        let (saves, on_save) = counter();
        let mut popup =
            FilterPopup::new(CommitteeFilter::default(), FilterPopupOptions::default())
                .with_on_save(on_save);
        assert_eq!(popup.state(), PopupState::Closed);

        // changes while closed are ignored
        popup.on_change();
        assert_eq!(popup.state(), PopupState::Closed);

        popup.toggle();
        assert_eq!(popup.state(), PopupState::Open);
        popup.control_mut().selected.push("Parks".into());
        popup.on_change();
        assert_eq!(popup.state(), PopupState::OpenWithPendingChanges);

        // outside click closes without saving
        popup.close();
        assert_eq!(popup.state(), PopupState::Closed);
        assert_eq!(saves.load(Ordering::SeqCst), 0);

        popup.toggle();
        popup.toggle();
        assert!(!popup.is_open());
    }

    #[test]
    fn test_close_on_change_hides_buttons_and_saves() {
        let (saves, on_save) = counter();
        let mut popup =
            FilterPopup::new(CommitteeFilter::default(), close_on_change()).with_on_save(on_save);
        popup.toggle();

        let view = popup.view();
        assert!(view.clear_button.is_none());
        assert!(view.save_button.is_none());

        popup.control_mut().selected.push("Budget".into());
        popup.on_change();
        assert!(!popup.is_open());
        assert_eq!(saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_limit_message_without_limit() {
        struct Unbounded;
        impl FilterControl for Unbounded {
            fn name(&self) -> &str {
                "Keyword"
            }
            fn clear(&mut self) {}
            fn text_rep(&self) -> String {
                String::new()
            }
            fn is_active(&self) -> bool {
                true
            }
            fn has_limit_error(&self) -> bool {
                true
            }
        }

        let popup = FilterPopup::new(Unbounded, FilterPopupOptions::default());
        assert_eq!(popup.errors(), vec!["Please select fewer keywords."]);
    }
}
