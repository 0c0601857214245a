//! Chart-ready summaries of a [`FilteredSubset`].
//!
//! Every aggregation is a pure function of the subset and returns `None` for an
//! empty one. [`summarize`] never calls them on an empty subset; it yields
//! [`DashboardView::NoData`] instead.

use std::collections::BTreeMap;

use serde::Serialize;

use super::filter::FilteredSubset;
use super::model::Direction;

/// Number of equal-width bins in the value histogram.
pub const HISTOGRAM_BINS: usize = 20;

/// Shown in place of the charts when nothing matches the filters.
pub const NO_DATA_NOTICE: &str =
    "No data available for the selected filters. Please adjust your filters.";

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionCount {
    pub direction: Direction,
    pub count: usize,
    /// Percentage of the subset, 0–100.
    pub share: f64,
}

/// Five-number summary plus Tukey whiskers for one group of values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Smallest value no further than 1.5·IQR below `q1`.
    pub lower_whisker: f64,
    /// Largest value no further than 1.5·IQR above `q3`.
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectionSummary {
    pub direction: Direction,
    pub summary: BoxSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyDistribution {
    pub year: i32,
    /// One entry per direction present in that year, in direction order.
    pub by_direction: Vec<DirectionSummary>,
}

/// Counts over `edges.len() - 1` equal-width bins. Every bin is half-open
/// except the last, which also holds the maximum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }

    /// Midpoint of bin `i`.
    pub fn center(&self, i: usize) -> f64 {
        (self.edges[i] + self.edges[i + 1]) / 2.0
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub year: i32,
    pub value: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyAverage {
    /// 1–12. Months without data are absent, not zero.
    pub month: u32,
    pub mean: f64,
    pub count: usize,
}

/// All six chart inputs for one non-empty subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregations {
    pub directions: Vec<DirectionCount>,
    pub yearly: Vec<YearlyDistribution>,
    pub histogram: Histogram,
    pub scatter: Vec<ScatterPoint>,
    pub categories: Vec<CategoryTotal>,
    pub monthly: Vec<MonthlyAverage>,
}

/// What the presentation layer should draw for the current filters.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DashboardView {
    /// The subset is empty; show [`NO_DATA_NOTICE`] and nothing else.
    #[default]
    NoData,
    Charts(Box<Aggregations>),
}

impl DashboardView {
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            DashboardView::NoData => Some(NO_DATA_NOTICE),
            DashboardView::Charts(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Compute every chart for `subset`, or [`DashboardView::NoData`] when it is empty.
pub fn summarize(subset: &FilteredSubset<'_>) -> DashboardView {
    if subset.is_empty() {
        return DashboardView::NoData;
    }
    aggregate_all(subset)
        .map(|a| DashboardView::Charts(Box::new(a)))
        .unwrap_or_default()
}

fn aggregate_all(subset: &FilteredSubset<'_>) -> Option<Aggregations> {
    Some(Aggregations {
        directions: direction_breakdown(subset)?,
        yearly: yearly_distribution(subset)?,
        histogram: value_histogram(subset)?,
        scatter: value_by_year(subset)?,
        categories: category_totals(subset)?,
        monthly: monthly_average(subset)?,
    })
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// Transactions per direction, most frequent first.
pub fn direction_breakdown(subset: &FilteredSubset<'_>) -> Option<Vec<DirectionCount>> {
    if subset.is_empty() {
        return None;
    }
    let mut counts: BTreeMap<&Direction, usize> = BTreeMap::new();
    for tx in subset.iter() {
        *counts.entry(&tx.direction).or_default() += 1;
    }

    let total = subset.len() as f64;
    let mut out: Vec<DirectionCount> = counts
        .into_iter()
        .map(|(direction, count)| DirectionCount {
            direction: direction.clone(),
            count,
            share: count as f64 / total * 100.0,
        })
        .collect();
    // Stable sort keeps direction order among ties.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    Some(out)
}

/// Value distribution per year, split by direction. Years ascending.
pub fn yearly_distribution(subset: &FilteredSubset<'_>) -> Option<Vec<YearlyDistribution>> {
    if subset.is_empty() {
        return None;
    }
    let mut groups: BTreeMap<i32, BTreeMap<&Direction, Vec<f64>>> = BTreeMap::new();
    for tx in subset.iter() {
        groups
            .entry(tx.year)
            .or_default()
            .entry(&tx.direction)
            .or_default()
            .push(tx.value);
    }

    Some(
        groups
            .into_iter()
            .map(|(year, dirs)| YearlyDistribution {
                year,
                by_direction: dirs
                    .into_iter()
                    .filter_map(|(direction, values)| {
                        Some(DirectionSummary {
                            direction: direction.clone(),
                            summary: BoxSummary::from_values(values)?,
                        })
                    })
                    .collect(),
            })
            .collect(),
    )
}

/// Counts of Value over [`HISTOGRAM_BINS`] bins spanning the subset's own range.
pub fn value_histogram(subset: &FilteredSubset<'_>) -> Option<Histogram> {
    let (mut lo, mut hi) = subset.iter().fold(None, |acc: Option<(f64, f64)>, tx| {
        Some(match acc {
            None => (tx.value, tx.value),
            Some((lo, hi)) => (lo.min(tx.value), hi.max(tx.value)),
        })
    })?;
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let bins = HISTOGRAM_BINS;
    // Interpolated and halved so that ranges wider than f64::MAX stay finite.
    let mut edges: Vec<f64> = (0..=bins)
        .map(|i| {
            let t = i as f64 / bins as f64;
            lo * (1.0 - t) + hi * t
        })
        .collect();
    edges[bins] = hi;

    let half_span = hi / 2.0 - lo / 2.0;
    let mut counts = vec![0usize; bins];
    for tx in subset.iter() {
        let offset = (tx.value / 2.0 - lo / 2.0) / half_span;
        let mut idx = ((offset * bins as f64) as usize).min(bins - 1);
        // Float error can land a value one bin off its edges.
        if idx > 0 && tx.value < edges[idx] {
            idx -= 1;
        } else if idx + 1 < bins && tx.value >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    Some(Histogram { edges, counts })
}

/// Every row as a (year, value, direction) point.
pub fn value_by_year(subset: &FilteredSubset<'_>) -> Option<Vec<ScatterPoint>> {
    if subset.is_empty() {
        return None;
    }
    Some(
        subset
            .iter()
            .map(|tx| ScatterPoint {
                year: tx.year,
                value: tx.value,
                direction: tx.direction.clone(),
            })
            .collect(),
    )
}

/// Sum of Value per category, categories in name order.
pub fn category_totals(subset: &FilteredSubset<'_>) -> Option<Vec<CategoryTotal>> {
    if subset.is_empty() {
        return None;
    }
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for tx in subset.iter() {
        *totals.entry(tx.category.as_str()).or_default() += tx.value;
    }
    Some(
        totals
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.to_string(),
                total,
            })
            .collect(),
    )
}

/// Mean Value per calendar month present in the subset, months ascending.
pub fn monthly_average(subset: &FilteredSubset<'_>) -> Option<Vec<MonthlyAverage>> {
    if subset.is_empty() {
        return None;
    }
    let mut sums: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for tx in subset.iter() {
        let entry = sums.entry(tx.month).or_default();
        entry.0 += tx.value;
        entry.1 += 1;
    }
    Some(
        sums.into_iter()
            .map(|(month, (sum, count))| MonthlyAverage {
                month,
                mean: sum / count as f64,
                count,
            })
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Box summary
// ---------------------------------------------------------------------------

impl BoxSummary {
    /// Summarize a group of values. `None` when `values` is empty.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let q1 = quantile(&values, 0.25);
        let q3 = quantile(&values, 0.75);
        let reach = 1.5 * (q3 - q1);
        let (low_fence, high_fence) = (q1 - reach, q3 + reach);

        let inside = || values.iter().copied().filter(|v| (low_fence..=high_fence).contains(v));
        let lower_whisker = inside().next().unwrap_or(q1);
        let upper_whisker = inside().last().unwrap_or(q3);
        let outliers = values
            .iter()
            .copied()
            .filter(|v| !(low_fence..=high_fence).contains(v))
            .collect();

        Some(BoxSummary {
            count: values.len(),
            min: values[0],
            q1,
            median: quantile(&values, 0.5),
            q3,
            max: values[values.len() - 1],
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

/// Linear-interpolated quantile of sorted, non-empty `values`.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
