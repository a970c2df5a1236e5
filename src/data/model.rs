use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Value – a single cell, independent of its column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
/// Grouping keys and selections live in `BTreeMap` / `BTreeSet`, so `Value` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Null,
}

// -- Manual Eq/Ord so we can put Value in BTreeSet --

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Integer(_) => 1,
                Float(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Text(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            // Salaries are whole amounts in practice; keep them readable.
            Value::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{v:.0}"),
            Value::Float(v) => write!(f, "{v:.2}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl Value {
    /// Try to interpret the value as an `f64`. Text and null cells are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if v.is_finite() => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Column – the fixed schema
// ---------------------------------------------------------------------------

/// Kind of data a column holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Text,
}

/// The eleven columns of the salaries dataset, in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    WorkYear,
    ExperienceLevel,
    EmploymentType,
    JobTitle,
    Salary,
    SalaryCurrency,
    SalaryInUsd,
    EmployeeResidence,
    RemoteRatio,
    CompanyLocation,
    CompanySize,
}

impl Column {
    pub const ALL: [Column; 11] = [
        Column::WorkYear,
        Column::ExperienceLevel,
        Column::EmploymentType,
        Column::JobTitle,
        Column::Salary,
        Column::SalaryCurrency,
        Column::SalaryInUsd,
        Column::EmployeeResidence,
        Column::RemoteRatio,
        Column::CompanyLocation,
        Column::CompanySize,
    ];

    /// Header name as it appears in the source file.
    pub fn name(self) -> &'static str {
        match self {
            Column::WorkYear => "work_year",
            Column::ExperienceLevel => "experience_level",
            Column::EmploymentType => "employment_type",
            Column::JobTitle => "job_title",
            Column::Salary => "salary",
            Column::SalaryCurrency => "salary_currency",
            Column::SalaryInUsd => "salary_in_usd",
            Column::EmployeeResidence => "employee_residence",
            Column::RemoteRatio => "remote_ratio",
            Column::CompanyLocation => "company_location",
            Column::CompanySize => "company_size",
        }
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::WorkYear | Column::RemoteRatio => ColumnKind::Integer,
            Column::Salary | Column::SalaryInUsd => ColumnKind::Float,
            _ => ColumnKind::Text,
        }
    }

    pub fn is_numeric(self) -> bool {
        self.kind() != ColumnKind::Text
    }

    /// All numeric columns, in file order.
    pub fn numeric() -> Vec<Column> {
        Column::ALL.into_iter().filter(|c| c.is_numeric()).collect()
    }

    /// All categorical (text) columns, in file order.
    pub fn categorical() -> Vec<Column> {
        Column::ALL.into_iter().filter(|c| !c.is_numeric()).collect()
    }

    /// Coerce a literal to this column's kind so that `40000` and `40000.0`
    /// compare equal against a float column.
    pub fn coerce(self, value: Value) -> Value {
        match (self.kind(), value) {
            (ColumnKind::Float, Value::Integer(i)) => Value::Float(i as f64),
            (ColumnKind::Integer, Value::Float(f)) if f.fract() == 0.0 => Value::Integer(f as i64),
            (_, v) => v,
        }
    }

    /// Display order for values of this column: seniority for experience level,
    /// headcount for company size, natural [`Value`] order otherwise.
    pub fn cmp_values(self, a: &Value, b: &Value) -> Ordering {
        let rank = |v: &Value| {
            let Value::Text(code) = v else {
                return usize::MAX;
            };
            let rank = match self {
                Column::ExperienceLevel => code.parse::<ExperienceLevel>().ok().map(|l| l as usize),
                Column::CompanySize => code.parse::<CompanySize>().ok().map(|s| s as usize),
                _ => None,
            };
            rank.unwrap_or(usize::MAX)
        };
        rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Column::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown column '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Categorical codes
// ---------------------------------------------------------------------------

/// Seniority code: entry, mid, senior, executive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum ExperienceLevel {
    #[serde(rename = "EN")]
    Entry,
    #[serde(rename = "MI")]
    Mid,
    #[serde(rename = "SE")]
    Senior,
    #[serde(rename = "EX")]
    Executive,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 4] = [
        ExperienceLevel::Entry,
        ExperienceLevel::Mid,
        ExperienceLevel::Senior,
        ExperienceLevel::Executive,
    ];

    pub fn code(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "EN",
            ExperienceLevel::Mid => "MI",
            ExperienceLevel::Senior => "SE",
            ExperienceLevel::Executive => "EX",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExperienceLevel::ALL
            .into_iter()
            .find(|l| l.code() == s)
            .ok_or_else(|| format!("unknown experience level '{s}'"))
    }
}

/// Company headcount bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum CompanySize {
    #[serde(rename = "S")]
    Small,
    #[serde(rename = "M")]
    Medium,
    #[serde(rename = "L")]
    Large,
}

impl CompanySize {
    pub const ALL: [CompanySize; 3] = [CompanySize::Small, CompanySize::Medium, CompanySize::Large];

    pub fn code(self) -> &'static str {
        match self {
            CompanySize::Small => "S",
            CompanySize::Medium => "M",
            CompanySize::Large => "L",
        }
    }
}

impl FromStr for CompanySize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CompanySize::ALL
            .into_iter()
            .find(|c| c.code() == s)
            .ok_or_else(|| format!("unknown company size '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// A single job-salary observation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    pub work_year: i64,
    pub experience_level: ExperienceLevel,
    pub employment_type: String,
    pub job_title: String,
    pub salary: f64,
    pub salary_currency: String,
    pub salary_in_usd: f64,
    pub employee_residence: String,
    pub remote_ratio: i64,
    pub company_location: String,
    pub company_size: CompanySize,
}

impl Record {
    /// Read one cell as a dynamically-typed value.
    pub fn value(&self, column: Column) -> Value {
        match column {
            Column::WorkYear => Value::Integer(self.work_year),
            Column::ExperienceLevel => Value::from(self.experience_level.code()),
            Column::EmploymentType => Value::Text(self.employment_type.clone()),
            Column::JobTitle => Value::Text(self.job_title.clone()),
            Column::Salary => Value::Float(self.salary),
            Column::SalaryCurrency => Value::Text(self.salary_currency.clone()),
            Column::SalaryInUsd => Value::Float(self.salary_in_usd),
            Column::EmployeeResidence => Value::Text(self.employee_residence.clone()),
            Column::RemoteRatio => Value::Integer(self.remote_ratio),
            Column::CompanyLocation => Value::Text(self.company_location.clone()),
            Column::CompanySize => Value::from(self.company_size.code()),
        }
    }

    /// Numeric cell without going through [`Value`].
    pub fn numeric(&self, column: Column) -> Option<f64> {
        let value = match column {
            Column::WorkYear => Some(self.work_year as f64),
            Column::Salary => Some(self.salary),
            Column::SalaryInUsd => Some(self.salary_in_usd),
            Column::RemoteRatio => Some(self.remote_ratio as f64),
            _ => None,
        };
        value.filter(|v| v.is_finite())
    }

    /// Check the dataset-wide invariants for a single row.
    pub fn validate(&self) -> Result<(), String> {
        if !self.salary_in_usd.is_finite() || self.salary_in_usd < 0.0 {
            return Err(format!(
                "salary_in_usd must be a non-negative number, got {}",
                self.salary_in_usd
            ));
        }
        if !matches!(self.remote_ratio, 0 | 50 | 100) {
            return Err(format!(
                "remote_ratio must be 0, 50 or 100, got {}",
                self.remote_ratio
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed unique values for categorical columns.
///
/// Built once and never mutated: there is no `&mut self` API.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    unique_values: BTreeMap<Column, BTreeSet<Value>>,
}

impl Dataset {
    /// Build column indices from the loaded records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut unique_values: BTreeMap<Column, BTreeSet<Value>> = BTreeMap::new();

        for record in &records {
            for col in Column::categorical() {
                unique_values
                    .entry(col)
                    .or_default()
                    .insert(record.value(col));
            }
        }
        Dataset {
            records,
            unique_values,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sorted unique values of a categorical column (empty for numeric columns).
    pub fn unique_values(&self, column: Column) -> BTreeSet<Value> {
        self.unique_values.get(&column).cloned().unwrap_or_default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
