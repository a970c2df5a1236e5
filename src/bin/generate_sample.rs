//! Writes a deterministic synthetic salaries dataset to
//! `sample_salaries.csv` and `sample_salaries.parquet`.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::print_batches;
use parquet::arrow::ArrowWriter;

const ROWS: usize = 600;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    /// Pick from `(item, weight)` pairs.
    fn weighted<'a, T>(&mut self, choices: &'a [(T, f64)]) -> &'a T {
        let total: f64 = choices.iter().map(|(_, w)| w).sum();
        let mut target = self.next_f64() * total;
        for (item, weight) in choices {
            if target < *weight {
                return item;
            }
            target -= weight;
        }
        &choices[choices.len() - 1].0
    }
}

/// `(code, salary multiplier, weight)`
const LEVELS: [(&str, f64, f64); 4] = [
    ("EN", 0.55, 0.15),
    ("MI", 0.80, 0.35),
    ("SE", 1.10, 0.42),
    ("EX", 1.60, 0.08),
];

/// `(title, base USD salary)`
const TITLES: [(&str, f64); 12] = [
    ("Data Scientist", 110_000.0),
    ("Data Engineer", 115_000.0),
    ("Data Analyst", 85_000.0),
    ("Machine Learning Engineer", 125_000.0),
    ("Research Scientist", 120_000.0),
    ("Data Science Manager", 140_000.0),
    ("Data Architect", 135_000.0),
    ("Big Data Engineer", 95_000.0),
    ("Machine Learning Scientist", 130_000.0),
    ("Principal Data Scientist", 160_000.0),
    ("AI Scientist", 115_000.0),
    ("BI Data Analyst", 75_000.0),
];

/// `(country, currency, USD per unit of currency, salary factor, weight)`
const COUNTRIES: [(&str, &str, f64, f64, f64); 7] = [
    ("US", "USD", 1.0, 1.0, 0.55),
    ("GB", "GBP", 1.25, 0.65, 0.10),
    ("CA", "CAD", 0.75, 0.75, 0.08),
    ("DE", "EUR", 1.08, 0.60, 0.08),
    ("IN", "INR", 0.012, 0.25, 0.08),
    ("FR", "EUR", 1.08, 0.55, 0.06),
    ("ES", "EUR", 1.08, 0.45, 0.05),
];

fn main() {
    let mut rng = SimpleRng::new(42);

    let mut work_year = Vec::with_capacity(ROWS);
    let mut experience_level = Vec::with_capacity(ROWS);
    let mut employment_type = Vec::with_capacity(ROWS);
    let mut job_title = Vec::with_capacity(ROWS);
    let mut salary = Vec::with_capacity(ROWS);
    let mut salary_currency = Vec::with_capacity(ROWS);
    let mut salary_in_usd = Vec::with_capacity(ROWS);
    let mut employee_residence = Vec::with_capacity(ROWS);
    let mut remote_ratio = Vec::with_capacity(ROWS);
    let mut company_location = Vec::with_capacity(ROWS);
    let mut company_size = Vec::with_capacity(ROWS);

    let level_weights: Vec<((&str, f64), f64)> =
        LEVELS.iter().map(|&(c, m, w)| ((c, m), w)).collect();
    let title_weights: Vec<((&str, f64), f64)> = TITLES
        .iter()
        .enumerate()
        .map(|(i, &(t, base))| ((t, base), 1.0 / (i as f64 + 1.0)))
        .collect();
    let country_weights: Vec<((&str, &str, f64, f64), f64)> = COUNTRIES
        .iter()
        .map(|&(c, cur, rate, f, w)| ((c, cur, rate, f), w))
        .collect();

    for _ in 0..ROWS {
        let year = *rng.weighted(&[(2020i64, 0.12), (2021, 0.22), (2022, 0.66)]);
        let &(level, level_mult) = rng.weighted(&level_weights);
        let &(title, base) = rng.weighted(&title_weights);
        let &(country, currency, usd_rate, factor) = rng.weighted(&country_weights);
        let emp = *rng.weighted(&[("FT", 0.96), ("PT", 0.02), ("CT", 0.01), ("FL", 0.01)]);
        let remote = *rng.weighted(&[(0i64, 0.21), (50, 0.16), (100, 0.63)]);
        let size = *rng.weighted(&[("S", 0.14), ("M", 0.54), ("L", 0.32)]);

        // 2021 dips, 2022 recovers.
        let year_factor = match year {
            2020 => 0.95,
            2021 => 0.90,
            _ => 1.05,
        };
        let usd = (base * level_mult * factor * year_factor * rng.gauss(1.0, 0.18).max(0.2)).round();

        work_year.push(year);
        experience_level.push(level);
        employment_type.push(emp);
        job_title.push(title);
        salary.push((usd / usd_rate).round());
        salary_currency.push(currency);
        salary_in_usd.push(usd);
        employee_residence.push(country);
        remote_ratio.push(remote);
        company_location.push(country);
        company_size.push(size);
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("work_year", DataType::Int64, false),
        Field::new("experience_level", DataType::Utf8, false),
        Field::new("employment_type", DataType::Utf8, false),
        Field::new("job_title", DataType::Utf8, false),
        Field::new("salary", DataType::Float64, false),
        Field::new("salary_currency", DataType::Utf8, false),
        Field::new("salary_in_usd", DataType::Float64, false),
        Field::new("employee_residence", DataType::Utf8, false),
        Field::new("remote_ratio", DataType::Int64, false),
        Field::new("company_location", DataType::Utf8, false),
        Field::new("company_size", DataType::Utf8, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(work_year)),
        Arc::new(StringArray::from(experience_level)),
        Arc::new(StringArray::from(employment_type)),
        Arc::new(StringArray::from(job_title)),
        Arc::new(Float64Array::from(salary)),
        Arc::new(StringArray::from(salary_currency)),
        Arc::new(Float64Array::from(salary_in_usd)),
        Arc::new(StringArray::from(employee_residence)),
        Arc::new(Int64Array::from(remote_ratio)),
        Arc::new(StringArray::from(company_location)),
        Arc::new(StringArray::from(company_size)),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).expect("Failed to create RecordBatch");

    // Write Parquet
    let parquet_path = "sample_salaries.parquet";
    let file = std::fs::File::create(parquet_path).expect("Failed to create parquet file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    // Write CSV with the same rows
    let csv_path = "sample_salaries.csv";
    let mut csv_writer = csv::Writer::from_path(csv_path).expect("Failed to create CSV file");
    let headers: Vec<String> = batch.schema().fields().iter().map(|f| f.name().clone()).collect();
    csv_writer.write_record(&headers).expect("Failed to write CSV header");
    for row in 0..batch.num_rows() {
        let cells: Vec<String> = (0..batch.num_columns())
            .map(|col| {
                arrow::util::display::array_value_to_string(batch.column(col), row)
                    .expect("Failed to format cell")
            })
            .collect();
        csv_writer.write_record(&cells).expect("Failed to write CSV row");
    }
    csv_writer.flush().expect("Failed to flush CSV file");

    print_batches(&[batch.slice(0, 5)]).expect("Failed to print preview");
    println!("Wrote {ROWS} salary records to {csv_path} and {parquet_path}");
}
