//! Headless model of the date-only property editor.
//!
//! The editor owns the stored value and the host configuration, mirrors the
//! value into its date input and renders a human-readable hint using the
//! configured display template. User actions notify registered listeners.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::{read_option, PropertyConfig, FORMAT_ALIAS};
use crate::format::{display_text, DEFAULT_FORMAT, PLACEHOLDER};
use crate::normalize::{encode, normalize, today};

/// Event names fired for every user-driven change.
pub const CHANGE_EVENTS: [&str; 2] = ["change", "property-value-change"];

/// Payload of a change notification.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChangeDetail {
    /// The canonical value, or an empty string when no date is selected.
    pub value: String,
}

/// A change notification sent to the host.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChangeEvent {
    /// Event name.
    pub name: String,
    /// Whether the event bubbles up to the host.
    pub bubbles: bool,
    /// Event payload.
    pub detail: ChangeDetail,
}

type Listener = Box<dyn FnMut(&ChangeEvent)>;

/// The date-only property editor.
pub struct DateOnlyEditor {
    value: String,
    config: Option<Box<dyn PropertyConfig>>,
    format: String,
    input_value: String,
    display: String,
    renders: u64,
    listeners: Vec<Listener>,
}

impl Default for DateOnlyEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DateOnlyEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DateOnlyEditor")
            .field("value", &self.value)
            .field("has_config", &self.config.is_some())
            .field("format", &self.format)
            .field("input_value", &self.input_value)
            .field("display", &self.display)
            .field("renders", &self.renders)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl DateOnlyEditor {
    /// Create an editor with no value and the default display template.
    #[must_use]
    pub fn new() -> Self {
        let mut editor = Self {
            value: String::new(),
            config: None,
            format: DEFAULT_FORMAT.to_string(),
            input_value: String::new(),
            display: PLACEHOLDER.to_string(),
            renders: 0,
            listeners: Vec::new(),
        };
        editor.render();
        editor
    }

    /// The stored value: empty or a canonical `YYYY-MM-DD` date.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Set the value from any representation.
    ///
    /// The value is normalized first. Setting the value the editor already
    /// holds does nothing.
    pub fn set_value(&mut self, value: Option<&str>) {
        self.store(normalize(value));
    }

    /// The attached host configuration.
    #[must_use]
    pub fn config(&self) -> Option<&dyn PropertyConfig> {
        self.config.as_deref()
    }

    /// Attach a host configuration and re-read the display template.
    ///
    /// When the configuration has no template the current one is kept.
    pub fn set_config(&mut self, config: Option<Box<dyn PropertyConfig>>) {
        self.config = config;
        self.format = read_option(self.config(), FORMAT_ALIAS, &self.format);
        log::debug!("Using display format {:?}", self.format);
        self.render();
    }

    /// The display template in use.
    #[must_use]
    pub fn format(&self) -> &str {
        &self.format
    }

    /// The value shown in the date input.
    #[must_use]
    pub fn input_value(&self) -> &str {
        &self.input_value
    }

    /// The rendered hint text.
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Number of renders performed so far.
    #[must_use]
    pub fn renders(&self) -> u64 {
        self.renders
    }

    /// Register a listener for change notifications.
    pub fn add_listener(&mut self, listener: impl FnMut(&ChangeEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Handle a change of the date input.
    pub fn pick(&mut self, raw: &str) {
        log::debug!("Date input changed to {raw:?}");
        self.set_value(Some(raw));
        self.emit_change();
    }

    /// Handle the "use today" action with the local calendar date.
    pub fn use_today(&mut self) {
        self.store(today());
        self.emit_change();
    }

    /// Handle the "use today" action with a given calendar date.
    ///
    /// A date whose year has no four-digit form clears the value.
    pub fn use_today_on(&mut self, date: NaiveDate) {
        self.store(encode(date).unwrap_or_default());
        self.emit_change();
    }

    fn store(&mut self, canonical: String) {
        if self.value == canonical {
            return;
        }
        log::debug!("Value changed from {:?} to {canonical:?}", self.value);
        self.value = canonical;
        self.render();
    }

    fn render(&mut self) {
        self.input_value.clone_from(&self.value);
        self.display = display_text(&self.value, &self.format);
        self.renders += 1;
        log::trace!("Rendered {:?} as {:?}", self.value, self.display);
    }

    fn emit_change(&mut self) {
        self.emit(&CHANGE_EVENTS);
    }

    fn emit(&mut self, names: &[&str]) {
        let detail = ChangeDetail {
            value: self.value.clone(),
        };
        for name in names {
            let event = ChangeEvent {
                name: (*name).to_string(),
                bubbles: true,
                detail: detail.clone(),
            };
            for listener in &mut self.listeners {
                listener(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::config::ConfigEntry;
    use crate::normalize::is_canonical;

    fn recording(editor: &mut DateOnlyEditor) -> Rc<RefCell<Vec<ChangeEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        editor.add_listener(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    #[test]
    fn starts_empty() {
        let editor = DateOnlyEditor::new();
        assert_eq!(editor.value(), "");
        assert_eq!(editor.format(), DEFAULT_FORMAT);
        assert_eq!(editor.display(), PLACEHOLDER);
        assert_eq!(editor.input_value(), "");
        assert!(editor.config().is_none());
    }

    #[test]
    fn set_value_normalizes_and_renders() {
        let mut editor = DateOnlyEditor::new();
        editor.set_value(Some("03/07/2024"));
        assert_eq!(editor.value(), "2024-03-07");
        assert_eq!(editor.input_value(), "2024-03-07");
        assert_eq!(editor.display(), "07 of March, 2024");
    }

    #[test]
    fn unchanged_value_skips_render() {
        let mut editor = DateOnlyEditor::new();
        editor.set_value(Some("2024-03-07"));
        let renders = editor.renders();
        editor.set_value(Some("2024-03-07"));
        editor.set_value(Some("3/7/2024"));
        assert_eq!(editor.renders(), renders);
    }

    #[test]
    fn unparseable_value_clears() {
        let mut editor = DateOnlyEditor::new();
        editor.set_value(Some("2024-03-07"));
        editor.set_value(Some("not a date"));
        assert_eq!(editor.value(), "");
        assert_eq!(editor.display(), PLACEHOLDER);
    }

    #[test]
    fn set_config_reads_format() {
        let mut editor = DateOnlyEditor::new();
        editor.set_value(Some("2024-12-25"));
        editor.set_config(Some(Box::new(vec![ConfigEntry::new("format", "D MMM YYYY")])));
        assert_eq!(editor.format(), "D MMM YYYY");
        assert_eq!(editor.display(), "25 Dec 2024");
        assert!(editor.config().is_some());
    }

    #[test]
    fn set_config_without_format_keeps_current() {
        let mut editor = DateOnlyEditor::new();
        editor.set_config(Some(Box::new(json!({"format": "YYYY"}))));
        editor.set_config(Some(Box::new(json!({"other": true}))));
        assert_eq!(editor.format(), "YYYY");
        editor.set_config(None);
        assert_eq!(editor.format(), "YYYY");
    }

    #[test]
    fn set_config_always_renders() {
        let mut editor = DateOnlyEditor::new();
        let renders = editor.renders();
        editor.set_config(None);
        assert_eq!(editor.renders(), renders + 1);
    }

    #[test]
    fn pick_emits_both_events() {
        let mut editor = DateOnlyEditor::new();
        let events = recording(&mut editor);
        editor.pick("2024-03-07");

        let events = events.borrow();
        let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, CHANGE_EVENTS);
        for event in events.iter() {
            assert!(event.bubbles);
            assert_eq!(event.detail.value, "2024-03-07");
        }
    }

    #[test]
    fn pick_emits_even_when_unchanged() {
        let mut editor = DateOnlyEditor::new();
        editor.set_value(Some("2024-03-07"));
        let events = recording(&mut editor);
        editor.pick("2024-03-07");
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn clearing_the_input_emits_empty_value() {
        let mut editor = DateOnlyEditor::new();
        editor.set_value(Some("2024-03-07"));
        let events = recording(&mut editor);
        editor.pick("");
        assert_eq!(editor.value(), "");
        assert!(events.borrow().iter().all(|e| e.detail.value.is_empty()));
    }

    #[test]
    fn use_today_stores_canonical_date() {
        let mut editor = DateOnlyEditor::new();
        let events = recording(&mut editor);
        editor.use_today_on(NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(editor.value(), "2024-03-07");
        assert_eq!(editor.display(), "07 of March, 2024");
        assert_eq!(events.borrow().len(), 2);

        editor.use_today();
        assert!(is_canonical(editor.value()));
        assert_eq!(events.borrow().len(), 4);
    }

    #[test]
    fn out_of_range_dates_clear_the_value() {
        let mut editor = DateOnlyEditor::new();
        editor.set_value(Some("2024-03-07"));
        editor.use_today_on(NaiveDate::from_ymd_opt(10_000, 1, 1).unwrap());
        assert_eq!(editor.value(), "");
        assert_eq!(editor.display(), PLACEHOLDER);

        editor.set_value(Some("2024-03-07"));
        editor.set_value(Some("99999"));
        assert_eq!(editor.value(), "");
    }

    #[test]
    fn event_serializes_with_detail() {
        let event = ChangeEvent {
            name: "change".to_string(),
            bubbles: true,
            detail: ChangeDetail {
                value: "2024-03-07".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"name": "change", "bubbles": true, "detail": {"value": "2024-03-07"}})
        );
    }

    #[test]
    fn host_round_trip_with_offset() {
        let mut editor = DateOnlyEditor::new();
        editor.set_value(Some("2024-03-07T00:00:00-05:00"));
        assert!(is_canonical(editor.value()));
        assert_eq!(editor.value(), normalize(Some("2024-03-07T00:00:00-05:00")));

        let display = editor.display();
        let month = editor.value()[5..7].parse::<usize>().unwrap();
        let day = &editor.value()[8..10];
        assert!(display.contains(crate::format::MONTH_NAMES[month - 1]));
        assert!(display.starts_with(day));
    }
}
