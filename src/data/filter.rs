use std::collections::{BTreeMap, BTreeSet};

use super::model::{Column, Dataset, Record, Value};

// ---------------------------------------------------------------------------
// Predicate – one row filter
// ---------------------------------------------------------------------------

/// A row filter over a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column = value`
    Equals { column: Column, value: Value },
    /// `column ∈ values`. An empty set matches nothing.
    OneOf { column: Column, values: BTreeSet<Value> },
    /// `low <= column <= high`. Non-numeric cells never match.
    Range { column: Column, low: f64, high: f64 },
}

impl Predicate {
    pub fn equals(column: Column, value: impl Into<Value>) -> Self {
        Predicate::Equals {
            column,
            value: column.coerce(value.into()),
        }
    }

    pub fn one_of<V: Into<Value>>(column: Column, values: impl IntoIterator<Item = V>) -> Self {
        Predicate::OneOf {
            column,
            values: values
                .into_iter()
                .map(|v| column.coerce(v.into()))
                .collect(),
        }
    }

    pub fn range(column: Column, low: f64, high: f64) -> Self {
        Predicate::Range { column, low, high }
    }

    /// Whether a record passes this predicate.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::Equals { column, value } => record.value(*column) == *value,
            Predicate::OneOf { column, values } => values.contains(&record.value(*column)),
            Predicate::Range { column, low, high } => record
                .numeric(*column)
                .is_some_and(|v| *low <= v && v <= *high),
        }
    }
}

// ---------------------------------------------------------------------------
// View – a filtered, read-only window onto a Dataset
// ---------------------------------------------------------------------------

/// Row indices into a [`Dataset`], always in dataset order.
#[derive(Debug, Clone, PartialEq)]
pub struct View<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> View<'a> {
    /// A view over every record.
    pub fn all(dataset: &'a Dataset) -> Self {
        View {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// Keep only the rows that match `predicate`. The receiver is left untouched.
    pub fn filter(&self, predicate: &Predicate) -> View<'a> {
        let records = self.dataset.records();
        View {
            dataset: self.dataset,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| predicate.matches(&records[i]))
                .collect(),
        }
    }

    /// Conjunction of all `predicates`; an empty slice keeps every row.
    pub fn filter_all(&self, predicates: &[Predicate]) -> View<'a> {
        let records = self.dataset.records();
        View {
            dataset: self.dataset,
            indices: self
                .indices
                .iter()
                .copied()
                .filter(|&i| predicates.iter().all(|p| p.matches(&records[i])))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    /// First `n` rows of the view.
    pub fn head(&self, n: usize) -> Vec<&'a Record> {
        self.iter().take(n).collect()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Multi-select state: which unique values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column → set of selected values.
/// A column absent from the map is unconstrained; a present but empty set hides everything.
pub type FilterState = BTreeMap<Column, BTreeSet<Value>>;

/// Initialise a [`FilterState`] for `columns` with all values selected (i.e., show everything).
pub fn init_filter_state(dataset: &Dataset, columns: &[Column]) -> FilterState {
    columns
        .iter()
        .map(|&col| (col, dataset.unique_values(col)))
        .collect()
}

/// Membership predicates for every constrained column.
pub fn selection_predicates(filters: &FilterState) -> Vec<Predicate> {
    filters
        .iter()
        .map(|(&column, selected)| Predicate::OneOf {
            column,
            values: selected.clone(),
        })
        .collect()
}
