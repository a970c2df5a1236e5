use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::data::filter::{init_filter_state, FilterState};
use crate::data::model::{Column, Dataset, Value};
use crate::query::{self, Category, DEFAULT_HEAD_ROWS};

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The dataset plus every user selection, independent of rendering.
///
/// The dataset is loaded once before the window opens and only ever borrowed
/// immutably; each frame recomputes the panels from these selections.
pub struct DashboardState {
    dataset: Dataset,

    /// Where the dataset was read from, shown in the top bar.
    pub source: PathBuf,

    /// Panel 1: how many leading rows to show.
    pub head_rows: usize,

    /// Panel 4: grouping column for the average-salary bar chart.
    pub category: Category,

    /// Panel 8: inclusive salary_in_usd range.
    pub salary_range: (f64, f64),

    /// Panel 10: selected experience levels and company sizes.
    pub selection: FilterState,
}

impl DashboardState {
    /// Ingest the loaded dataset and initialise every selection to its default.
    pub fn new(dataset: Dataset, source: PathBuf) -> Self {
        let salary_range = query::salary_bounds(&dataset).unwrap_or((0.0, 0.0));
        let selection = init_filter_state(&dataset, &[Column::ExperienceLevel, Column::CompanySize]);
        if query::france_salary_distribution(&dataset).is_no_data() {
            log::warn!("No French companies in {}; the distribution panel will be empty", source.display());
        }

        Self {
            dataset,
            source,
            head_rows: DEFAULT_HEAD_ROWS,
            category: Category::default(),
            salary_range,
            selection,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Selected values for one multi-select column.
    pub fn selected(&self, column: Column) -> BTreeSet<Value> {
        self.selection.get(&column).cloned().unwrap_or_default()
    }

    /// Toggle a single value in a column's selection.
    pub fn toggle_selection(&mut self, column: Column, value: &Value) {
        let selected = self.selection.entry(column).or_default();
        if selected.contains(value) {
            selected.remove(value);
        } else {
            selected.insert(value.clone());
        }
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: Column) {
        self.selection.insert(column, self.dataset.unique_values(column));
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, column: Column) {
        self.selection.insert(column, BTreeSet::new());
    }

    /// Keep the salary range ordered after either slider moves.
    pub fn normalise_salary_range(&mut self) {
        let (low, high) = self.salary_range;
        if low > high {
            self.salary_range = (high, low);
        }
    }
}
