//! Aggregation stage: KPIs, grouped counts and monthly buckets.
//!
//! Every output is a pure function of one FilteredView. Nothing here can
//! fail: dates and identifiers were typed when the table loaded.

use crate::{
    filter::FilteredView,
    types::{ComplaintId, YearMonth},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthCount {
    pub month: YearMonth,
    pub count: usize,
}

/// One (issue, sub_issue) pair of the issue tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTreeLeaf {
    pub issue: String,
    pub sub_issue: Option<String>,
    /// Sum of `complaint_id` over the pair's rows.
    pub complaint_id_sum: ComplaintId,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateOutputs {
    pub total_count: usize,
    pub closed_count: usize,
    pub timely_count: usize,
    /// `None` for an empty view.
    pub timely_pct: Option<f64>,
    pub in_progress_count: usize,
    /// Descending count, ties in first-seen order.
    pub product_counts: Vec<CategoryCount>,
    /// Strictly ascending by month.
    pub monthly_counts: Vec<MonthCount>,
    /// Descending count, ties in first-seen order.
    pub channel_counts: Vec<CategoryCount>,
    /// Sorted by (issue, sub_issue); a missing sub_issue sorts first.
    pub issue_tree_counts: Vec<IssueTreeLeaf>,
}

impl AggregateOutputs {
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }

    pub fn product_count(&self, product: &str) -> Option<usize> {
        lookup(&self.product_counts, product)
    }

    pub fn channel_count(&self, channel: &str) -> Option<usize> {
        lookup(&self.channel_counts, channel)
    }

    pub fn monthly_count(&self, month: YearMonth) -> Option<usize> {
        self.monthly_counts
            .iter()
            .find(|m| m.month == month)
            .map(|m| m.count)
    }

    pub fn issue_leaf(&self, issue: &str, sub_issue: Option<&str>) -> Option<&IssueTreeLeaf> {
        self.issue_tree_counts
            .iter()
            .find(|leaf| leaf.issue == issue && leaf.sub_issue.as_deref() == sub_issue)
    }
}

fn lookup(counts: &[CategoryCount], label: &str) -> Option<usize> {
    counts.iter().find(|c| c.label == label).map(|c| c.count)
}

pub fn aggregate(view: &FilteredView<'_>) -> AggregateOutputs {
    let mut closed_count = 0;
    let mut timely_count = 0;
    let mut in_progress_count = 0;
    let mut monthly: BTreeMap<YearMonth, usize> = BTreeMap::new();
    let mut tree: BTreeMap<(&str, Option<&str>), (ComplaintId, usize)> = BTreeMap::new();

    for record in view.records() {
        if record.is_closed() {
            closed_count += 1;
        }
        if record.timely {
            timely_count += 1;
        }
        if record.is_in_progress() {
            in_progress_count += 1;
        }
        *monthly.entry(record.month()).or_default() += 1;

        let leaf = tree
            .entry((record.issue.as_str(), record.sub_issue.as_deref()))
            .or_default();
        leaf.0 = leaf.0.saturating_add(record.complaint_id);
        leaf.1 += 1;
    }

    let total_count = view.len();
    AggregateOutputs {
        total_count,
        closed_count,
        timely_count,
        timely_pct: timely_percentage(timely_count, total_count),
        in_progress_count,
        product_counts: value_counts(view.records().map(|r| r.product.as_str())),
        monthly_counts: monthly
            .into_iter()
            .map(|(month, count)| MonthCount { month, count })
            .collect(),
        channel_counts: value_counts(view.records().map(|r| r.submitted_via.as_str())),
        issue_tree_counts: tree
            .into_iter()
            .map(|((issue, sub_issue), (complaint_id_sum, row_count))| IssueTreeLeaf {
                issue: issue.to_string(),
                sub_issue: sub_issue.map(str::to_string),
                complaint_id_sum,
                row_count,
            })
            .collect(),
    }
}

/// `timely / total * 100`, rounded to 2 decimals. `None` when `total == 0`.
pub fn timely_percentage(timely: usize, total: usize) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(round2(timely as f64 / total as f64 * 100.0))
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Count occurrences; order by count descending, ties by first appearance.
pub fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<CategoryCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();
    for value in values {
        match index.get(value) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(CategoryCount {
                    label: value.to_string(),
                    count: 1,
                });
            }
        }
    }
    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
