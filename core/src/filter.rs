//! Filter stage.
//!
//! Filters compose one way: state first, then channel. Each step narrows
//! the row set of the step before it; no step copies or edits a record.

use crate::{
    config::SelectorConfig,
    error::{DashError, DashResult},
    record::Record,
    table::Table,
    types::RowIndex,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum StateSelection {
    /// The "All States" sentinel: no predicate.
    #[default]
    All,
    Only(String),
}

impl StateSelection {
    /// Map a selector label to a selection. The sentinel label means `All`.
    pub fn from_label(label: &str, selectors: &SelectorConfig) -> Self {
        if label == selectors.all_states_label {
            StateSelection::All
        } else {
            StateSelection::Only(label.to_string())
        }
    }

    pub fn label<'a>(&'a self, selectors: &'a SelectorConfig) -> &'a str {
        match self {
            StateSelection::All => &selectors.all_states_label,
            StateSelection::Only(state) => state,
        }
    }

    fn matches(&self, record: &Record) -> bool {
        match self {
            StateSelection::All => true,
            StateSelection::Only(state) => record.state == *state,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selections {
    pub state: StateSelection,
    /// `None` means no channel predicate.
    pub channel: Option<String>,
}

impl Selections {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn state(state: impl Into<String>) -> Self {
        Self {
            state: StateSelection::Only(state.into()),
            channel: None,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }
}

/// A subset of table rows, in table order.
#[derive(Debug, Clone)]
pub struct FilteredView<'t> {
    table: &'t Table,
    rows: Vec<RowIndex>,
}

impl<'t> FilteredView<'t> {
    /// Every row of the table.
    pub fn full(table: &'t Table) -> Self {
        Self {
            table,
            rows: (0..table.len()).collect(),
        }
    }

    pub fn narrow_state(&self, selection: &StateSelection) -> Self {
        match selection {
            StateSelection::All => self.clone(),
            only => self.narrow(|r| only.matches(r)),
        }
    }

    pub fn narrow_channel(&self, channel: &str) -> Self {
        self.narrow(|r| r.submitted_via == channel)
    }

    fn narrow(&self, predicate: impl Fn(&Record) -> bool) -> Self {
        let rows = self
            .rows
            .iter()
            .copied()
            .filter(|&row| predicate(&self.table.records()[row]))
            .collect();
        Self {
            table: self.table,
            rows,
        }
    }

    pub fn table(&self) -> &'t Table {
        self.table
    }

    pub fn rows(&self) -> &[RowIndex] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &'t Record> + '_ {
        let records = self.table.records();
        self.rows.iter().map(move |&row| &records[row])
    }

    /// `Err(EmptyView)` when no row survived the filters.
    pub fn require_non_empty(&self) -> DashResult<&Self> {
        if self.rows.is_empty() {
            Err(DashError::EmptyView)
        } else {
            Ok(self)
        }
    }
}

/// State predicate, then the channel predicate when one is selected.
pub fn apply_filters<'t>(table: &'t Table, selections: &Selections) -> FilteredView<'t> {
    let by_state = FilteredView::full(table).narrow_state(&selections.state);
    match &selections.channel {
        Some(channel) => by_state.narrow_channel(channel),
        None => by_state,
    }
}

/// Sentinel, distinct states in first-seen order, then the configured
/// extras. Extras are appended even if they already occur in the data.
pub fn state_options(table: &Table, selectors: &SelectorConfig) -> Vec<String> {
    let mut options = vec![selectors.all_states_label.clone()];
    options.extend(distinct(table.records().iter().map(|r| r.state.as_str())));
    options.extend(selectors.extra_state_options.iter().cloned());
    options
}

/// Distinct channels of the state-filtered view, in first-seen order.
pub fn channel_options(state_view: &FilteredView<'_>) -> Vec<String> {
    distinct(state_view.records().map(|r| r.submitted_via.as_str()))
}

/// Selector semantics: keep the requested channel if it is still offered,
/// otherwise fall back to the first option. No options -> no channel.
pub fn resolve_channel(options: &[String], requested: Option<&str>) -> Option<String> {
    requested
        .and_then(|wanted| options.iter().find(|o| o.as_str() == wanted))
        .or_else(|| options.first())
        .cloned()
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_channel_prefers_requested_then_first() {
        let options = vec!["Web".to_string(), "Phone".to_string()];
        assert_eq!(resolve_channel(&options, Some("Phone")).as_deref(), Some("Phone"));
        assert_eq!(resolve_channel(&options, Some("Fax")).as_deref(), Some("Web"));
        assert_eq!(resolve_channel(&options, None).as_deref(), Some("Web"));
        assert_eq!(resolve_channel(&[], Some("Web")), None);
    }

    #[test]
    fn sentinel_label_maps_to_all() {
        let selectors = SelectorConfig::default();
        assert_eq!(
            StateSelection::from_label("All States", &selectors),
            StateSelection::All
        );
        let co = StateSelection::from_label("CO", &selectors);
        assert_eq!(co, StateSelection::Only("CO".into()));
        assert_eq!(co.label(&selectors), "CO");
        assert_eq!(StateSelection::All.label(&selectors), "All States");
    }
}
