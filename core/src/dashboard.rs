//! The dashboard session: owns the table and runs one pipeline pass per
//! interaction.
//!
//! PASS ORDER (fixed):
//!   1. State options from the whole table
//!   2. State filter
//!   3. Channel options from the state view, channel resolved against them
//!   4. Aggregation over the state view
//!   5. Channel filter (feeds the focus section and pie highlight)
//!   6. Presentation
//!
//! The table is fetched once in `open` and never re-fetched.

use crate::{
    aggregate::{aggregate, AggregateOutputs},
    config::DashConfig,
    error::DashResult,
    filter::{self, FilteredView, Selections},
    presentation::{self, DashboardView, PresentationInput},
    source::{self, MemorySource},
    table::Table,
    types::RawRecord,
};

pub struct Dashboard {
    config: DashConfig,
    table: Table,
}

/// Result of one interaction.
#[derive(Debug, Clone)]
pub struct Interaction {
    /// Selections after channel resolution; feed back into the next call.
    pub selections: Selections,
    pub outputs: AggregateOutputs,
    pub view: DashboardView,
}

impl Dashboard {
    /// Resolve the configured source and load the table. Fatal on any
    /// load or parse error.
    pub fn open(config: DashConfig) -> DashResult<Self> {
        let mut source = source::open_configured(&config.source)?;
        let table = Table::load(source.as_mut())?;
        Ok(Self::with_table(config, table))
    }

    pub fn with_table(config: DashConfig, table: Table) -> Self {
        Self { config, table }
    }

    /// In-memory rows with the test config.
    pub fn build_test(records: Vec<RawRecord>) -> DashResult<Self> {
        let mut source = MemorySource::new("test", records);
        let table = Table::load(&mut source)?;
        Ok(Self::with_table(DashConfig::default_test(), table))
    }

    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn state_options(&self) -> Vec<String> {
        filter::state_options(&self.table, &self.config.selectors)
    }

    pub fn interact(&self, requested: &Selections) -> Interaction {
        let state_options = self.state_options();
        let state_view = FilteredView::full(&self.table).narrow_state(&requested.state);
        let channel_options = filter::channel_options(&state_view);
        let selections = Selections {
            state: requested.state.clone(),
            channel: filter::resolve_channel(&channel_options, requested.channel.as_deref()),
        };

        let outputs = aggregate(&state_view);
        let channel_outputs = selections
            .channel
            .is_some()
            .then(|| aggregate(&filter::apply_filters(&self.table, &selections)));
        let notice = state_view.require_non_empty().err().map(|e| e.to_string());

        log::debug!(
            "interaction: state={} channel={:?} rows={} channel_rows={:?}",
            selections.state.label(&self.config.selectors),
            selections.channel,
            state_view.len(),
            channel_outputs.as_ref().map(|o| o.total_count),
        );

        let view = presentation::present(PresentationInput {
            config: &self.config,
            outputs: &outputs,
            state_options,
            channel_options,
            selections: &selections,
            channel_outputs,
            notice,
        });

        Interaction {
            selections,
            outputs,
            view,
        }
    }
}
