//! The ten dashboard analyses.
//!
//! Every function takes the immutable [`Dataset`] plus the user's current
//! selections and returns a value ready to render. Panels that can come up
//! empty return [`Analysis::NoData`] instead of a zeroed statistic.

use std::collections::BTreeSet;
use std::fmt;

use crate::data::aggregate::{
    self, describe, distribution, group_reduce, top_n, AggregationResult, ColumnSummary,
    CorrelationMatrix, Reducer, Series,
};
use crate::data::filter::{selection_predicates, FilterState, Predicate, View};
use crate::data::model::{Column, Dataset, Record, Value};

pub const HEAD_ROWS_MIN: usize = 1;
pub const HEAD_ROWS_MAX: usize = 100;
pub const DEFAULT_HEAD_ROWS: usize = 10;
pub const SALARY_RANGE_PREVIEW: usize = 10;
pub const ADVANCED_FILTER_PREVIEW: usize = 20;
pub const TOP_JOB_TITLES: usize = 10;
pub const TOP_COUNTRIES: usize = 5;

/// Company location used by the distribution panel.
const FRANCE: &str = "FR";

// ---------------------------------------------------------------------------
// Result wrappers
// ---------------------------------------------------------------------------

/// A panel's result, or an explicit "no data" marker when nothing matched.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis<T> {
    Ready(T),
    NoData,
}

impl<T> Analysis<T> {
    /// `NoData` when `empty` holds, otherwise `Ready(value)`.
    fn unless_empty(value: T, empty: bool) -> Self {
        if empty {
            Analysis::NoData
        } else {
            Analysis::Ready(value)
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, Analysis::NoData)
    }
}

/// Row count of a filtered view plus a preview of its first rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRows<'a> {
    pub count: usize,
    pub rows: Vec<&'a Record>,
}

impl<'a> FilteredRows<'a> {
    fn from_view(view: &View<'a>, preview: usize) -> Self {
        FilteredRows {
            count: view.len(),
            rows: view.head(preview),
        }
    }
}

/// Columns offered by the "average salary by" dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    ExperienceLevel,
    EmploymentType,
    JobTitle,
    CompanyLocation,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::ExperienceLevel,
        Category::EmploymentType,
        Category::JobTitle,
        Category::CompanyLocation,
    ];

    pub fn column(self) -> Column {
        match self {
            Category::ExperienceLevel => Column::ExperienceLevel,
            Category::EmploymentType => Column::EmploymentType,
            Category::JobTitle => Column::JobTitle,
            Category::CompanyLocation => Column::CompanyLocation,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column().name())
    }
}

impl TryFrom<Column> for Category {
    type Error = String;

    fn try_from(column: Column) -> Result<Self, Self::Error> {
        Category::ALL
            .into_iter()
            .find(|c| c.column() == column)
            .ok_or_else(|| format!("'{column}' is not a salary category"))
    }
}

// ---------------------------------------------------------------------------
// Analyses
// ---------------------------------------------------------------------------

/// 1. First `n` rows, with `n` clamped to the slider's range.
pub fn head_rows(dataset: &Dataset, n: usize) -> &[Record] {
    let n = n.clamp(HEAD_ROWS_MIN, HEAD_ROWS_MAX).min(dataset.len());
    &dataset.records()[..n]
}

/// 2. Descriptive statistics of every numeric column except `work_year`.
pub fn summary_statistics(dataset: &Dataset) -> Vec<ColumnSummary> {
    let columns: Vec<Column> = Column::numeric()
        .into_iter()
        .filter(|&c| c != Column::WorkYear)
        .collect();
    describe(&View::all(dataset), &columns)
}

/// 3. USD salaries of French companies, grouped by experience level from entry to executive.
pub fn france_salary_distribution(dataset: &Dataset) -> Analysis<Vec<(Value, Vec<f64>)>> {
    let france = View::all(dataset).filter(&Predicate::equals(Column::CompanyLocation, FRANCE));
    let groups = distribution(&france, Column::ExperienceLevel, Column::SalaryInUsd);
    Analysis::unless_empty(groups, france.is_empty())
}

/// 4. Mean USD salary per value of `category`, highest first.
pub fn average_salary_by_category(dataset: &Dataset, category: Category) -> Analysis<Vec<(Value, f64)>> {
    let means = group_reduce(
        &View::all(dataset),
        &[category.column()],
        Column::SalaryInUsd,
        Reducer::Mean,
    )
    .ranked()
    .pairs();
    let empty = means.is_empty();
    Analysis::unless_empty(means, empty)
}

/// 5. Pearson correlations between all numeric columns.
pub fn correlation_matrix(dataset: &Dataset) -> Analysis<CorrelationMatrix> {
    let matrix = aggregate::correlation_matrix(&View::all(dataset), &Column::numeric());
    Analysis::unless_empty(matrix, dataset.is_empty())
}

/// 6. Mean USD salary per year for each of the most common job titles.
pub fn salary_evolution_top_jobs(dataset: &Dataset) -> Analysis<Vec<Series>> {
    let all = View::all(dataset);
    let titles = top_n(&all, Column::JobTitle, TOP_JOB_TITLES);
    let scoped = all.filter(&Predicate::OneOf {
        column: Column::JobTitle,
        values: titles,
    });

    let series = group_reduce(
        &scoped,
        &[Column::WorkYear, Column::JobTitle],
        Column::SalaryInUsd,
        Reducer::Mean,
    )
    .series_by(Column::JobTitle);
    let empty = series.is_empty();
    Analysis::unless_empty(series, empty)
}

/// 7. Median USD salary per (experience level, company size).
pub fn median_salary_by_experience_and_size(dataset: &Dataset) -> Analysis<AggregationResult> {
    let medians = group_reduce(
        &View::all(dataset),
        &[Column::ExperienceLevel, Column::CompanySize],
        Column::SalaryInUsd,
        Reducer::Median,
    );
    let empty = medians.is_empty();
    Analysis::unless_empty(medians, empty)
}

/// Lowest and highest USD salary, used as the range slider's bounds.
pub fn salary_bounds(dataset: &Dataset) -> Option<(f64, f64)> {
    dataset.records().iter().map(|r| r.salary_in_usd).fold(None, |acc, v| {
        Some(match acc {
            None => (v, v),
            Some((lo, hi)) => (f64::min(lo, v), f64::max(hi, v)),
        })
    })
}

/// 8. Rows with `low <= salary_in_usd <= high`.
pub fn filter_by_salary_range(dataset: &Dataset, low: f64, high: f64) -> FilteredRows<'_> {
    let view = View::all(dataset).filter(&Predicate::range(Column::SalaryInUsd, low, high));
    FilteredRows::from_view(&view, SALARY_RANGE_PREVIEW)
}

/// 9. Mean USD salary per (company location, remote ratio) for the most common locations.
pub fn remote_impact_top_countries(dataset: &Dataset) -> Analysis<AggregationResult> {
    let all = View::all(dataset);
    let countries = top_n(&all, Column::CompanyLocation, TOP_COUNTRIES);
    let scoped = all.filter(&Predicate::OneOf {
        column: Column::CompanyLocation,
        values: countries,
    });

    let means = group_reduce(
        &scoped,
        &[Column::CompanyLocation, Column::RemoteRatio],
        Column::SalaryInUsd,
        Reducer::Mean,
    );
    let empty = means.is_empty();
    Analysis::unless_empty(means, empty)
}

/// 10. Rows whose experience level and company size are both selected.
pub fn advanced_filter<'a>(
    dataset: &'a Dataset,
    experience_levels: &BTreeSet<Value>,
    company_sizes: &BTreeSet<Value>,
) -> FilteredRows<'a> {
    let selection: FilterState = [
        (Column::ExperienceLevel, experience_levels.clone()),
        (Column::CompanySize, company_sizes.clone()),
    ]
    .into_iter()
    .collect();

    let view = View::all(dataset).filter_all(&selection_predicates(&selection));
    FilteredRows::from_view(&view, ADVANCED_FILTER_PREVIEW)
}
