//! Presentation adapter: aggregate outputs to KPI tiles and chart models.
//!
//! No aggregation happens here. An empty view turns every chart into a
//! placeholder and the percentage tile into "N/A".

use crate::{
    aggregate::{round2, AggregateOutputs, CategoryCount},
    config::{DashConfig, TreemapWeight},
    filter::Selections,
};
use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE: &str = "N/A";

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiTile {
    pub key: String,
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChartState<T> {
    Ready { chart: T },
    Placeholder { message: String },
}

impl<T> ChartState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ChartState::Ready { chart } => Some(chart),
            ChartState::Placeholder { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<CategoryCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub label: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineChart {
    pub title: String,
    pub points: Vec<LinePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: usize,
    pub share_pct: f64,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
    pub selected: Option<String>,
    pub selected_share_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapNode {
    pub label: String,
    pub weight: i64,
    pub row_count: usize,
    pub children: Vec<TreemapNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treemap {
    pub title: String,
    pub weight: TreemapWeight,
    pub roots: Vec<TreemapNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorView {
    pub label: String,
    pub options: Vec<String>,
    pub selected: Option<String>,
}

/// The channel-filtered slice of the state view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelFocus {
    pub channel: String,
    pub caption: String,
    pub complaints: usize,
    /// Share of the state view's complaints.
    pub share_pct: Option<f64>,
    /// Full aggregate of the view with both predicates applied.
    pub outputs: AggregateOutputs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub title: String,
    pub state_selector: SelectorView,
    pub channel_selector: SelectorView,
    pub kpis: Vec<KpiTile>,
    pub product_chart: ChartState<BarChart>,
    pub monthly_chart: ChartState<LineChart>,
    pub channel_chart: ChartState<PieChart>,
    pub issue_treemap: ChartState<Treemap>,
    pub channel_focus: Option<ChannelFocus>,
    /// Visible, non-fatal message (e.g. the empty-view notice).
    pub notice: Option<String>,
    pub footer: Option<String>,
}

/// Everything the adapter needs for one render.
pub struct PresentationInput<'a> {
    pub config: &'a DashConfig,
    pub outputs: &'a AggregateOutputs,
    pub state_options: Vec<String>,
    pub channel_options: Vec<String>,
    /// Resolved selections (channel already defaulted).
    pub selections: &'a Selections,
    /// Aggregate of the view after the channel predicate.
    pub channel_outputs: Option<AggregateOutputs>,
    pub notice: Option<String>,
}

// ── Adapter ──────────────────────────────────────────────────────────────────

pub fn present(input: PresentationInput<'_>) -> DashboardView {
    let config = input.config;
    let outputs = input.outputs;
    let empty_message = input
        .notice
        .clone()
        .unwrap_or_else(|| "No data for the current selection".to_string());
    let has_data = |ready: bool| ready && !outputs.is_empty();

    let product_chart = if has_data(!outputs.product_counts.is_empty()) {
        ChartState::Ready {
            chart: BarChart {
                title: "Number of complaints by product".into(),
                bars: outputs.product_counts.clone(),
            },
        }
    } else {
        placeholder(&empty_message)
    };

    let monthly_chart = if has_data(!outputs.monthly_counts.is_empty()) {
        ChartState::Ready {
            chart: LineChart {
                title: "Number of complaints by month".into(),
                points: outputs
                    .monthly_counts
                    .iter()
                    .map(|m| LinePoint {
                        label: m.month.to_string(),
                        value: m.count,
                    })
                    .collect(),
            },
        }
    } else {
        placeholder(&empty_message)
    };

    let selected_channel = input.selections.channel.as_deref();
    let channel_chart = if has_data(!outputs.channel_counts.is_empty()) {
        ChartState::Ready {
            chart: pie_chart(outputs, selected_channel),
        }
    } else {
        placeholder(&empty_message)
    };

    let issue_treemap = if has_data(!outputs.issue_tree_counts.is_empty()) {
        ChartState::Ready {
            chart: treemap(outputs, config.treemap_weight),
        }
    } else {
        placeholder(&empty_message)
    };

    let channel_focus = match (selected_channel, input.channel_outputs) {
        (Some(channel), Some(channel_outputs)) => Some(ChannelFocus {
            channel: channel.to_string(),
            caption: format!("Number of Complaints Submitted Via {channel}"),
            complaints: channel_outputs.total_count,
            share_pct: share(channel_outputs.total_count, outputs.total_count),
            outputs: channel_outputs,
        }),
        _ => None,
    };

    DashboardView {
        title: config.title.clone(),
        state_selector: SelectorView {
            label: "Select State".into(),
            options: input.state_options,
            selected: Some(input.selections.state.label(&config.selectors).to_string()),
        },
        channel_selector: SelectorView {
            label: "Select Submitted Via Channel".into(),
            options: input.channel_options,
            selected: input.selections.channel.clone(),
        },
        kpis: kpi_tiles(outputs),
        product_chart,
        monthly_chart,
        channel_chart,
        issue_treemap,
        channel_focus,
        notice: input.notice,
        footer: config.footer.clone(),
    }
}

pub fn kpi_tiles(outputs: &AggregateOutputs) -> Vec<KpiTile> {
    let tile = |key: &str, label: &str, value: String| KpiTile {
        key: key.into(),
        label: label.into(),
        value,
    };
    vec![
        tile(
            "total",
            "Total Number of Complaints",
            outputs.total_count.to_string(),
        ),
        tile(
            "closed",
            "Total Number of Complaints with Closed Status",
            outputs.closed_count.to_string(),
        ),
        tile(
            "timely_pct",
            "% of Timely Responded Complaints",
            format_pct(outputs.timely_pct),
        ),
        tile(
            "in_progress",
            "Total Number of Complaints with In Progress Status",
            outputs.in_progress_count.to_string(),
        ),
    ]
}

/// `50.0%`, `66.67%`, or `N/A`.
pub fn format_pct(pct: Option<f64>) -> String {
    match pct {
        Some(p) if p.fract() == 0.0 => format!("{p:.1}%"),
        Some(p) => format!("{p}%"),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn placeholder<T>(message: &str) -> ChartState<T> {
    ChartState::Placeholder {
        message: message.to_string(),
    }
}

fn share(part: usize, whole: usize) -> Option<f64> {
    (whole > 0).then(|| round2(part as f64 / whole as f64 * 100.0))
}

fn pie_chart(outputs: &AggregateOutputs, selected: Option<&str>) -> PieChart {
    let total: usize = outputs.channel_counts.iter().map(|c| c.count).sum();
    let slices: Vec<PieSlice> = outputs
        .channel_counts
        .iter()
        .map(|c| PieSlice {
            label: c.label.clone(),
            value: c.count,
            share_pct: share(c.count, total).unwrap_or(0.0),
            highlighted: Some(c.label.as_str()) == selected,
        })
        .collect();
    let selected_share_pct = slices.iter().find(|s| s.highlighted).map(|s| s.share_pct);
    PieChart {
        title: "Number of Complaints Submitted".into(),
        slices,
        selected: selected.map(str::to_string),
        selected_share_pct,
    }
}

fn treemap(outputs: &AggregateOutputs, weight: TreemapWeight) -> Treemap {
    let mut roots: Vec<TreemapNode> = Vec::new();
    // Leaves arrive sorted by issue, so each issue's leaves are contiguous.
    for leaf in &outputs.issue_tree_counts {
        let leaf_weight = match weight {
            TreemapWeight::ComplaintIdSum => leaf.complaint_id_sum,
            TreemapWeight::RowCount => leaf.row_count as i64,
        };
        if roots.last().map(|r| r.label.as_str()) != Some(leaf.issue.as_str()) {
            roots.push(TreemapNode {
                label: leaf.issue.clone(),
                weight: 0,
                row_count: 0,
                children: Vec::new(),
            });
        }
        let Some(root) = roots.last_mut() else {
            continue;
        };
        root.weight = root.weight.saturating_add(leaf_weight);
        root.row_count += leaf.row_count;
        // Rows without a sub-issue weigh on the issue tile itself.
        if let Some(sub_issue) = &leaf.sub_issue {
            root.children.push(TreemapNode {
                label: sub_issue.clone(),
                weight: leaf_weight,
                row_count: leaf.row_count,
                children: Vec::new(),
            });
        }
    }
    Treemap {
        title: "Complaints by issue and sub-issue".into(),
        weight,
        roots,
    }
}
