//! Dashboard session tests: one pipeline pass per interaction, rendered
//! through the presentation adapter.

use complaint_dash_core::{
    config::{DashConfig, TreemapWeight},
    dashboard::Dashboard,
    filter::{Selections, StateSelection},
    presentation::{ChartState, NOT_AVAILABLE},
    table::Table,
    types::RawRecord,
};
use serde_json::json;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn raw(value: serde_json::Value) -> RawRecord {
    value.as_object().cloned().unwrap()
}

fn scenario_rows() -> Vec<RawRecord> {
    vec![
        raw(json!({
            "state": "CO", "company_response": "Closed", "timely": "Yes",
            "product": "Loan", "submitted_via": "Web", "date_received": "2023-01-05",
            "issue": "Billing", "sub_issue": "Fee", "complaint_id": 1
        })),
        raw(json!({
            "state": "CO", "company_response": "In Progress", "timely": "No",
            "product": "Loan", "submitted_via": "Phone", "date_received": "2023-02-10",
            "issue": "Billing", "sub_issue": "Fee", "complaint_id": 2
        })),
        raw(json!({
            "state": "TX", "company_response": "Closed", "timely": "Yes",
            "product": "Card", "submitted_via": "Web", "date_received": "2023-01-20",
            "issue": "Fraud", "sub_issue": null, "complaint_id": 3
        })),
    ]
}

fn make_dashboard() -> Dashboard {
    Dashboard::build_test(scenario_rows()).unwrap()
}

fn kpi(view: &complaint_dash_core::presentation::DashboardView, key: &str) -> String {
    view.kpis
        .iter()
        .find(|t| t.key == key)
        .map(|t| t.value.clone())
        .unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[test]
fn all_states_renders_kpi_tiles() {
    let dashboard = make_dashboard();
    let interaction = dashboard.interact(&Selections::all());
    let view = &interaction.view;

    assert_eq!(view.title, "Consumer Financial Complaints Dashboard");
    assert_eq!(view.kpis.len(), 4);
    assert_eq!(kpi(view, "total"), "3");
    assert_eq!(kpi(view, "closed"), "2");
    assert_eq!(kpi(view, "timely_pct"), "66.67%");
    assert_eq!(kpi(view, "in_progress"), "1");
    assert!(view.notice.is_none());
    assert_eq!(
        view.state_selector.options,
        vec!["All States", "CO", "TX", "Colorado"]
    );
    assert_eq!(view.state_selector.selected.as_deref(), Some("All States"));
}

#[test]
fn colorado_code_renders_fifty_percent() {
    let dashboard = make_dashboard();
    let interaction = dashboard.interact(&Selections::state("CO"));
    assert_eq!(kpi(&interaction.view, "total"), "2");
    assert_eq!(kpi(&interaction.view, "timely_pct"), "50.0%");
    assert_eq!(interaction.outputs.closed_count, 1);
}

/// With no channel requested the first option is selected, like a selectbox.
#[test]
fn channel_defaults_to_first_option() {
    let dashboard = make_dashboard();
    let interaction = dashboard.interact(&Selections::state("CO"));

    assert_eq!(interaction.view.channel_selector.options, vec!["Web", "Phone"]);
    assert_eq!(interaction.selections.channel.as_deref(), Some("Web"));

    let focus = interaction.view.channel_focus.unwrap();
    assert_eq!(focus.caption, "Number of Complaints Submitted Via Web");
    assert_eq!(focus.complaints, 1);
    assert_eq!(focus.share_pct, Some(50.0));
}

/// The focus section carries the whole aggregate of the state + channel view.
#[test]
fn channel_focus_aggregates_the_channel_view() {
    let dashboard = make_dashboard();
    let selections = Selections {
        channel: Some("Phone".into()),
        ..Selections::state("CO")
    };
    let interaction = dashboard.interact(&selections);

    let focus = interaction.view.channel_focus.unwrap();
    assert_eq!(focus.channel, "Phone");
    assert_eq!(focus.complaints, 1);
    assert_eq!(focus.outputs.total_count, 1);
    assert_eq!(focus.outputs.closed_count, 0);
    assert_eq!(focus.outputs.in_progress_count, 1);
    assert_eq!(focus.outputs.timely_pct, Some(0.0));
    assert_eq!(focus.outputs.channel_count("Phone"), Some(1));
    assert_eq!(focus.outputs.channel_count("Web"), None);
    assert_eq!(focus.outputs.issue_leaf("Billing", Some("Fee")).unwrap().complaint_id_sum, 2);

    // Charts still describe the state view.
    assert_eq!(interaction.outputs.total_count, 2);
    assert_eq!(interaction.outputs.timely_pct, Some(50.0));
}

/// A channel no longer offered after a state change falls back to the first one.
#[test]
fn stale_channel_is_replaced_after_state_change() {
    let dashboard = make_dashboard();
    let first = dashboard.interact(&Selections::state("CO").with_channel("Phone"));
    assert_eq!(first.selections.channel.as_deref(), Some("Phone"));

    let next = Selections {
        state: StateSelection::Only("TX".into()),
        ..first.selections
    };
    let second = dashboard.interact(&next);
    assert_eq!(second.selections.channel.as_deref(), Some("Web"));
}

/// The pie shows the full channel distribution of the state view and
/// highlights the selected channel's share.
#[test]
fn pie_highlights_selected_channel_share() {
    let dashboard = make_dashboard();
    let interaction = dashboard.interact(&Selections::all().with_channel("Phone"));
    let pie = interaction.view.channel_chart.ready().unwrap();

    assert_eq!(pie.slices.len(), 2);
    let phone = pie.slices.iter().find(|s| s.label == "Phone").unwrap();
    assert!(phone.highlighted);
    assert_eq!(phone.share_pct, 33.33);
    assert_eq!(pie.selected_share_pct, Some(33.33));
    assert_eq!(pie.slices.iter().filter(|s| s.highlighted).count(), 1);

    // KPIs still describe the state view, not the channel slice.
    assert_eq!(interaction.outputs.total_count, 3);
}

#[test]
fn charts_carry_series_for_non_empty_view() {
    let dashboard = make_dashboard();
    let view = dashboard.interact(&Selections::all()).view;

    let bars = view.product_chart.ready().unwrap();
    assert_eq!(bars.bars[0].label, "Loan");
    assert_eq!(bars.bars[0].count, 2);

    let line = view.monthly_chart.ready().unwrap();
    let labels: Vec<&str> = line.points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["2023-01", "2023-02"]);
    assert_eq!(line.points[0].value, 2);
}

#[test]
fn treemap_weights_by_identifier_sum_by_default() {
    let dashboard = make_dashboard();
    let view = dashboard.interact(&Selections::all()).view;
    let treemap = view.issue_treemap.ready().unwrap();

    assert_eq!(treemap.weight, TreemapWeight::ComplaintIdSum);
    assert_eq!(treemap.roots.len(), 2);
    let billing = treemap.roots.iter().find(|n| n.label == "Billing").unwrap();
    assert_eq!(billing.weight, 3);
    assert_eq!(billing.children.len(), 1);
    assert_eq!(billing.children[0].label, "Fee");
    let fraud = treemap.roots.iter().find(|n| n.label == "Fraud").unwrap();
    assert_eq!(fraud.weight, 3);
    assert!(fraud.children.is_empty());
}

#[test]
fn treemap_can_weight_by_row_count() {
    let table = Table::from_raw("scenario", scenario_rows()).unwrap();
    let config = DashConfig {
        treemap_weight: TreemapWeight::RowCount,
        ..DashConfig::default_test()
    };
    let dashboard = Dashboard::with_table(config, table);
    let view = dashboard.interact(&Selections::all()).view;
    let treemap = view.issue_treemap.ready().unwrap();

    let billing = treemap.roots.iter().find(|n| n.label == "Billing").unwrap();
    assert_eq!(billing.weight, 2);
    assert_eq!(billing.children[0].weight, 2);
}

/// Selecting the appended "Colorado" option on data without it renders
/// placeholders and an N/A percentage instead of failing.
#[test]
fn empty_view_renders_placeholders() {
    let dashboard = make_dashboard();
    let interaction = dashboard.interact(&Selections::state("Colorado").with_channel("Web"));
    let view = &interaction.view;

    assert_eq!(kpi(view, "total"), "0");
    assert_eq!(kpi(view, "timely_pct"), NOT_AVAILABLE);
    assert!(view.channel_selector.options.is_empty());
    assert_eq!(view.channel_selector.selected, None);
    assert!(view.channel_focus.is_none());
    assert_eq!(
        view.notice.as_deref(),
        Some("No complaints match the current selection")
    );
    for placeholder in [
        matches!(view.product_chart, ChartState::Placeholder { .. }),
        matches!(view.monthly_chart, ChartState::Placeholder { .. }),
        matches!(view.channel_chart, ChartState::Placeholder { .. }),
        matches!(view.issue_treemap, ChartState::Placeholder { .. }),
    ] {
        assert!(placeholder);
    }
}

#[test]
fn view_serializes_for_the_ui_process() {
    let dashboard = make_dashboard();
    let view = dashboard.interact(&Selections::state("TX")).view;
    let value = serde_json::to_value(&view).unwrap();

    assert_eq!(value["kpis"][0]["value"], json!("1"));
    assert_eq!(value["product_chart"]["state"], json!("ready"));
    assert_eq!(value["product_chart"]["chart"]["bars"][0]["label"], json!("Card"));
    assert_eq!(value["footer"], json!("Designed by Raza"));
}

/// Interactions never touch the loaded table.
#[test]
fn interactions_reuse_the_same_table() {
    let dashboard = make_dashboard();
    let before = dashboard.table().records().to_vec();
    for state in ["CO", "TX", "Colorado", "All States"] {
        let selections = Selections {
            state: StateSelection::from_label(state, &dashboard.config().selectors),
            channel: None,
        };
        let _ = dashboard.interact(&selections);
    }
    assert_eq!(dashboard.table().records(), before.as_slice());
    assert_eq!(dashboard.table().len(), 3);
}
