//! Grouped statistics over a [`View`].
//!
//! Every statistic is computed from numeric, non-missing cells only. A group
//! with nothing to reduce is dropped from the result instead of being
//! reported as zero, and undefined correlations are `None`.

use std::collections::{BTreeMap, BTreeSet};

use super::filter::View;
use super::model::{Column, Value};

// ---------------------------------------------------------------------------
// Reducers
// ---------------------------------------------------------------------------

/// Aggregation applied within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
    Median,
    /// Number of non-null cells.
    Count,
}

impl Reducer {
    /// Reduce one group's cells. `None` means the statistic is undefined for this group.
    pub fn reduce(self, cells: &[Value]) -> Option<f64> {
        match self {
            Reducer::Count => Some(cells.iter().filter(|v| !v.is_null()).count() as f64),
            Reducer::Mean => mean(&numeric_cells(cells)),
            Reducer::Median => {
                let mut values = numeric_cells(cells);
                sort_floats(&mut values);
                quantile(&values, 0.5)
            }
        }
    }
}

fn numeric_cells(cells: &[Value]) -> Vec<f64> {
    cells.iter().filter_map(Value::as_f64).collect()
}

fn sort_floats(values: &mut [f64]) {
    values.sort_by(|a, b| a.total_cmp(b));
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1), undefined below two values.
fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Quantile of already-sorted values with linear interpolation between neighbours.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

// ---------------------------------------------------------------------------
// Grouped results
// ---------------------------------------------------------------------------

/// One group and its statistic.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupEntry {
    pub key: Vec<Value>,
    pub value: f64,
}

/// Output of [`group_reduce`]: entries in natural key order unless [`ranked`](Self::ranked).
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    pub group_by: Vec<Column>,
    pub entries: Vec<GroupEntry>,
}

/// A labelled sequence of `(x, y)` points pivoted out of a two-key result.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: Value,
    pub points: Vec<(Value, f64)>,
}

impl AggregationResult {
    /// Order by statistic descending, ties by ascending key.
    pub fn ranked(mut self) -> Self {
        self.entries.sort_by(|a, b| {
            b.value
                .total_cmp(&a.value)
                .then_with(|| a.key.cmp(&b.key))
        });
        self
    }

    #[cfg(test)]
    pub fn get(&self, key: &[Value]) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.key.as_slice() == key)
            .map(|e| e.value)
    }

    /// Single-key results as `(key, value)` pairs, in current order.
    pub fn pairs(&self) -> Vec<(Value, f64)> {
        self.entries
            .iter()
            .filter_map(|e| e.key.first().map(|k| (k.clone(), e.value)))
            .collect()
    }

    /// Split a two-key result into one series per value of `label_column`,
    /// using the other key as x. Series and points follow [`Column::cmp_values`].
    pub fn series_by(&self, label_column: Column) -> Vec<Series> {
        let Some(label_idx) = self.group_by.iter().position(|&c| c == label_column) else {
            return Vec::new();
        };
        let Some(x_idx) = (0..self.group_by.len()).find(|&i| i != label_idx) else {
            return Vec::new();
        };

        let x_column = self.group_by[x_idx];

        let mut by_label: BTreeMap<Value, Vec<(Value, f64)>> = BTreeMap::new();
        for entry in &self.entries {
            by_label
                .entry(entry.key[label_idx].clone())
                .or_default()
                .push((entry.key[x_idx].clone(), entry.value));
        }

        let mut series: Vec<Series> = by_label
            .into_iter()
            .map(|(label, mut points)| {
                points.sort_by(|a, b| x_column.cmp_values(&a.0, &b.0));
                Series { label, points }
            })
            .collect();
        series.sort_by(|a, b| label_column.cmp_values(&a.label, &b.label));
        series
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Group the view by `group_by` and reduce `value_column` within each group.
/// Groups whose statistic is undefined are omitted.
pub fn group_reduce(
    view: &View<'_>,
    group_by: &[Column],
    value_column: Column,
    reducer: Reducer,
) -> AggregationResult {
    let mut groups: BTreeMap<Vec<Value>, Vec<Value>> = BTreeMap::new();
    for record in view.iter() {
        let key = group_by.iter().map(|&c| record.value(c)).collect();
        groups.entry(key).or_default().push(record.value(value_column));
    }

    let entries = groups
        .into_iter()
        .filter_map(|(key, cells)| reducer.reduce(&cells).map(|value| GroupEntry { key, value }))
        .collect();

    AggregationResult {
        group_by: group_by.to_vec(),
        entries,
    }
}

/// Frequency of each value of `column`, most frequent first, ties by ascending value.
pub fn value_counts(view: &View<'_>, column: Column) -> Vec<(Value, usize)> {
    let mut counts: BTreeMap<Value, usize> = BTreeMap::new();
    for record in view.iter() {
        *counts.entry(record.value(column)).or_default() += 1;
    }
    let mut counts: Vec<(Value, usize)> = counts.into_iter().collect();
    // Stable sort over a key-ordered vector keeps ascending values within equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// The `n` most frequent values of `column`.
pub fn top_n(view: &View<'_>, column: Column, n: usize) -> BTreeSet<Value> {
    value_counts(view, column)
        .into_iter()
        .take(n)
        .map(|(v, _)| v)
        .collect()
}

/// Raw numeric values of `value_column` per value of `group_column`,
/// groups in the column's display order.
pub fn distribution(
    view: &View<'_>,
    group_column: Column,
    value_column: Column,
) -> Vec<(Value, Vec<f64>)> {
    let mut groups: BTreeMap<Value, Vec<f64>> = BTreeMap::new();
    for record in view.iter() {
        if let Some(v) = record.numeric(value_column) {
            groups.entry(record.value(group_column)).or_default().push(v);
        }
    }
    let mut groups: Vec<(Value, Vec<f64>)> = groups.into_iter().collect();
    groups.sort_by(|a, b| group_column.cmp_values(&a.0, &b.0));
    groups
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// `describe()`-style summary of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: Column,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Statistic names in `describe()` order.
pub const STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

impl ColumnSummary {
    /// Values in [`STATISTICS`] order.
    pub fn values(&self) -> [Option<f64>; 8] {
        [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ]
    }
}

pub fn describe(view: &View<'_>, columns: &[Column]) -> Vec<ColumnSummary> {
    columns
        .iter()
        .map(|&column| {
            let mut values: Vec<f64> = view.iter().filter_map(|r| r.numeric(column)).collect();
            sort_floats(&mut values);
            ColumnSummary {
                column,
                count: values.len(),
                mean: mean(&values),
                std: std_dev(&values),
                min: values.first().copied(),
                q25: quantile(&values, 0.25),
                median: quantile(&values, 0.5),
                q75: quantile(&values, 0.75),
                max: values.last().copied(),
            }
        })
        .collect()
}

/// Five-number summary for a box plot, whiskers at 1.5 × IQR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        sort_floats(&mut sorted);

        let q1 = quantile(&sorted, 0.25)?;
        let median = quantile(&sorted, 0.5)?;
        let q3 = quantile(&sorted, 0.75)?;
        let fence = 1.5 * (q3 - q1);

        let lower_whisker = sorted.iter().copied().find(|&v| v >= q1 - fence).unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= q3 + fence)
            .unwrap_or(q3);

        Some(BoxStats {
            lower_whisker,
            q1,
            median,
            q3,
            upper_whisker,
        })
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pairwise Pearson correlations. `None` marks an undefined coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    cells: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.cells.get(i).and_then(|row| row.get(j)).copied().flatten()
    }

    #[cfg(test)]
    pub fn get_by(&self, a: Column, b: Column) -> Option<f64> {
        let i = self.columns.iter().position(|&c| c == a)?;
        let j = self.columns.iter().position(|&c| c == b)?;
        self.get(i, j)
    }

    pub fn size(&self) -> usize {
        self.columns.len()
    }
}

/// Pearson correlation between every pair of `columns`, over rows where both cells are numeric.
///
/// A pair is undefined when fewer than two rows qualify or either side is constant,
/// which includes the diagonal entry of a constant column.
pub fn correlation_matrix(view: &View<'_>, columns: &[Column]) -> CorrelationMatrix {
    let n = columns.len();
    let mut cells = vec![vec![None; n]; n];

    for i in 0..n {
        for j in i..n {
            let pairs: Vec<(f64, f64)> = view
                .iter()
                .filter_map(|r| Some((r.numeric(columns[i])?, r.numeric(columns[j])?)))
                .collect();
            let r = pearson(&pairs).map(|r| if i == j { 1.0 } else { r });
            cells[i][j] = r;
            cells[j][i] = r;
        }
    }

    CorrelationMatrix {
        columns: columns.to_vec(),
        cells,
    }
}

fn is_constant(mut values: impl Iterator<Item = f64>) -> bool {
    match values.next() {
        Some(first) => values.all(|v| v == first),
        None => true,
    }
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    if is_constant(pairs.iter().map(|p| p.0)) || is_constant(pairs.iter().map(|p| p.1)) {
        return None;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mx;
        let dy = y - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::{CompanySize, Dataset, ExperienceLevel};

    fn sample() -> Dataset {
        let mut rows = vec![
            record("FR", ExperienceLevel::Entry, 40_000.0),
            record("FR", ExperienceLevel::Senior, 90_000.0),
            record("US", ExperienceLevel::Senior, 120_000.0),
            record("US", ExperienceLevel::Senior, 100_000.0),
            record("DE", ExperienceLevel::Mid, 60_000.0),
        ];
        for (i, r) in rows.iter_mut().enumerate() {
            r.work_year = 2020 + i as i64;
            r.salary = r.salary_in_usd * 0.9 + (i as f64) * 1_000.0;
        }
        rows[4].company_size = CompanySize::Small;
        Dataset::from_records(rows)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_group_mean_and_median() {
        let ds = sample();
        let view = View::all(&ds);

        let means = group_reduce(&view, &[Column::CompanyLocation], Column::SalaryInUsd, Reducer::Mean);
        assert_eq!(means.get(&[Value::from("FR")]), Some(65_000.0));
        assert_eq!(means.get(&[Value::from("US")]), Some(110_000.0));

        let medians = group_reduce(&view, &[Column::ExperienceLevel], Column::SalaryInUsd, Reducer::Median);
        assert_eq!(medians.get(&[Value::from("SE")]), Some(100_000.0));
        assert_eq!(medians.get(&[Value::from("EN")]), Some(40_000.0));
    }

    #[test]
    fn test_count_sums_to_row_count() {
        let ds = sample();
        let view = View::all(&ds);
        for keys in [
            vec![Column::CompanyLocation],
            vec![Column::ExperienceLevel, Column::CompanySize],
            vec![Column::WorkYear],
        ] {
            let counts = group_reduce(&view, &keys, Column::SalaryInUsd, Reducer::Count);
            let total: f64 = counts.entries.iter().map(|e| e.value).sum();
            assert_eq!(total as usize, view.len());
        }
    }

    #[test]
    fn test_mean_of_text_column_is_omitted_not_zero() {
        let ds = sample();
        let result = group_reduce(&View::all(&ds), &[Column::CompanyLocation], Column::JobTitle, Reducer::Mean);
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_view_gives_empty_result() {
        let ds = Dataset::from_records(Vec::new());
        let result = group_reduce(&View::all(&ds), &[Column::CompanyLocation], Column::SalaryInUsd, Reducer::Mean);
        assert!(result.is_empty());
        assert!(describe(&View::all(&ds), &[Column::Salary])[0].mean.is_none());
    }

    #[test]
    fn test_ranked_breaks_ties_by_ascending_key() {
        let result = AggregationResult {
            group_by: vec![Column::JobTitle],
            entries: vec![
                GroupEntry { key: vec![Value::from("b")], value: 5.0 },
                GroupEntry { key: vec![Value::from("c")], value: 9.0 },
                GroupEntry { key: vec![Value::from("a")], value: 5.0 },
            ],
        }
        .ranked();
        let order: Vec<String> = result.pairs().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_top_n_orders_by_count_then_name() {
        let ds = sample();
        let view = View::all(&ds);
        let counts = value_counts(&view, Column::CompanyLocation);
        assert_eq!(
            counts,
            vec![(Value::from("FR"), 2), (Value::from("US"), 2), (Value::from("DE"), 1)]
        );
        let top = top_n(&view, Column::CompanyLocation, 1);
        assert_eq!(top.into_iter().collect::<Vec<_>>(), vec![Value::from("FR")]);
    }

    #[test]
    fn test_series_by_pivots_two_key_result() {
        let ds = sample();
        let result = group_reduce(
            &View::all(&ds),
            &[Column::WorkYear, Column::CompanyLocation],
            Column::SalaryInUsd,
            Reducer::Mean,
        );
        let series = result.series_by(Column::CompanyLocation);
        let labels: Vec<String> = series.iter().map(|s| s.label.to_string()).collect();
        assert_eq!(labels, vec!["DE", "FR", "US"]);
        let us = &series[2];
        assert_eq!(
            us.points,
            vec![(Value::Integer(2022), 120_000.0), (Value::Integer(2023), 100_000.0)]
        );
    }

    #[test]
    fn test_series_and_distribution_follow_seniority() {
        let mut rows = vec![
            record("US", ExperienceLevel::Executive, 300.0),
            record("US", ExperienceLevel::Entry, 100.0),
            record("US", ExperienceLevel::Senior, 200.0),
        ];
        rows[0].company_size = CompanySize::Large;
        rows[1].company_size = CompanySize::Small;
        let ds = Dataset::from_records(rows);
        let view = View::all(&ds);

        let levels: Vec<Value> = distribution(&view, Column::ExperienceLevel, Column::SalaryInUsd)
            .into_iter()
            .map(|(level, _)| level)
            .collect();
        assert_eq!(levels, ["EN", "SE", "EX"].map(Value::from).to_vec());

        let result = group_reduce(
            &view,
            &[Column::ExperienceLevel, Column::CompanySize],
            Column::SalaryInUsd,
            Reducer::Median,
        );
        let series = result.series_by(Column::CompanySize);
        let sizes: Vec<Value> = series.iter().map(|s| s.label.clone()).collect();
        assert_eq!(sizes, ["S", "M", "L"].map(Value::from).to_vec());

        let by_level = result.series_by(Column::ExperienceLevel);
        assert_eq!(by_level[0].label, Value::from("EN"));
        assert_eq!(by_level[2].label, Value::from("EX"));
    }

    #[test]
    fn test_describe_matches_linear_quantiles() {
        let rows: Vec<_> = [1.0, 2.0, 3.0, 4.0]
            .into_iter()
            .map(|v| record("FR", ExperienceLevel::Entry, v))
            .collect();
        let ds = Dataset::from_records(rows);
        let summary = &describe(&View::all(&ds), &[Column::SalaryInUsd])[0];
        assert_eq!(summary.count, 4);
        assert_eq!(summary.mean, Some(2.5));
        assert!(approx(summary.std.unwrap(), 1.2909944487358056));
        assert_eq!(summary.min, Some(1.0));
        assert_eq!(summary.q25, Some(1.75));
        assert_eq!(summary.median, Some(2.5));
        assert_eq!(summary.q75, Some(3.25));
        assert_eq!(summary.max, Some(4.0));
    }

    #[test]
    fn test_correlation_is_symmetric_with_unit_diagonal() {
        let ds = sample();
        let cols = [Column::WorkYear, Column::Salary, Column::SalaryInUsd];
        let m = correlation_matrix(&View::all(&ds), &cols);
        for i in 0..cols.len() {
            assert_eq!(m.get(i, i), Some(1.0));
            for j in 0..cols.len() {
                assert_eq!(m.get(i, j), m.get(j, i));
                let r = m.get(i, j).unwrap();
                assert!((-1.0..=1.0).contains(&r));
            }
        }
    }

    #[test]
    fn test_constant_column_correlation_is_undefined() {
        let ds = sample();
        // remote_ratio is 100 for every sample row.
        let cols = [Column::SalaryInUsd, Column::RemoteRatio];
        let m = correlation_matrix(&View::all(&ds), &cols);
        assert_eq!(m.get_by(Column::SalaryInUsd, Column::SalaryInUsd), Some(1.0));
        assert_eq!(m.get_by(Column::SalaryInUsd, Column::RemoteRatio), None);
        assert_eq!(m.get_by(Column::RemoteRatio, Column::SalaryInUsd), None);
        assert_eq!(m.get_by(Column::RemoteRatio, Column::RemoteRatio), None);
    }

    #[test]
    fn test_perfectly_linear_columns_correlate_to_one() {
        let rows: Vec<_> = [10.0, 20.0, 35.0]
            .into_iter()
            .map(|v| {
                let mut r = record("FR", ExperienceLevel::Entry, v);
                r.salary = 2.0 * v + 1.0;
                r
            })
            .collect();
        let ds = Dataset::from_records(rows);
        let m = correlation_matrix(&View::all(&ds), &[Column::Salary, Column::SalaryInUsd]);
        assert!(approx(m.get(0, 1).unwrap(), 1.0));
    }

    #[test]
    fn test_box_stats_whiskers_exclude_outliers() {
        let stats = BoxStats::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(stats.q1, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.q3, 4.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 4.0);
        assert!(BoxStats::from_values(&[]).is_none());
    }
}
