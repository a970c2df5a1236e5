use eframe::egui::{self, RichText, Ui};

use crate::data::model::{Column, Record};
use crate::query::{self, Analysis, Category, HEAD_ROWS_MAX, HEAD_ROWS_MIN};
use crate::state::DashboardState;
use crate::ui::{plot, table};

const USD: &str = "salary_in_usd";

// ---------------------------------------------------------------------------
// Page layout
// ---------------------------------------------------------------------------

/// Render the ten panels top to bottom, pairing the smaller ones side by side.
pub fn dashboard(ui: &mut Ui, state: &mut DashboardState) {
    ui.heading("Data Science Salaries");
    ui.label("Explore salary trends through interactive views of the dataset.");
    ui.add_space(8.0);

    head_rows_panel(ui, state);
    summary_panel(ui, state);

    ui.columns(2, |cols| {
        france_panel(&mut cols[0], state);
        category_panel(&mut cols[1], state);
    });

    correlation_panel(ui, state);

    ui.columns(2, |cols| {
        evolution_panel(&mut cols[0], state);
        median_panel(&mut cols[1], state);
    });

    ui.columns(2, |cols| {
        salary_range_panel(&mut cols[0], state);
        remote_panel(&mut cols[1], state);
    });

    advanced_filter_panel(ui, state);
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(12.0);
    ui.separator();
    ui.strong(RichText::new(title).size(17.0));
}

fn row_count(ui: &mut Ui, count: usize) {
    ui.label(format!("Matching records: {count}"));
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

fn head_rows_panel(ui: &mut Ui, state: &mut DashboardState) {
    section(ui, "Data preview");
    ui.add(egui::Slider::new(&mut state.head_rows, HEAD_ROWS_MIN..=HEAD_ROWS_MAX).text("rows"));

    let rows: Vec<&Record> = query::head_rows(state.dataset(), state.head_rows).iter().collect();
    if rows.is_empty() {
        plot::no_data(ui, "The dataset has no rows.");
    } else {
        table::record_table(ui, "head_rows", &rows);
    }
}

fn summary_panel(ui: &mut Ui, state: &DashboardState) {
    section(ui, "Summary statistics");
    let summaries = query::summary_statistics(state.dataset());
    table::summary_table(ui, "summary", &summaries);
}

fn france_panel(ui: &mut Ui, state: &DashboardState) {
    section(ui, "Salaries in France by experience level");
    match query::france_salary_distribution(state.dataset()) {
        Analysis::Ready(groups) => {
            plot::box_plot(ui, "france_box", &groups, Column::ExperienceLevel.name(), USD)
        }
        Analysis::NoData => plot::no_data(ui, "No data for France."),
    }
}

fn category_panel(ui: &mut Ui, state: &mut DashboardState) {
    section(ui, "Average salary by category");

    let current = state.category;
    egui::ComboBox::from_id_salt("category")
        .selected_text(current.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for category in Category::ALL {
                if ui
                    .selectable_label(current == category, category.to_string())
                    .clicked()
                {
                    log::debug!("Average salary grouped by {category}");
                    state.category = category;
                }
            }
        });

    match query::average_salary_by_category(state.dataset(), state.category) {
        Analysis::Ready(pairs) => plot::bar_chart(
            ui,
            "category_bars",
            &pairs,
            state.category.column().name(),
            "mean salary_in_usd",
        ),
        Analysis::NoData => plot::no_data(ui, "No data."),
    }
}

fn correlation_panel(ui: &mut Ui, state: &DashboardState) {
    section(ui, "Correlation between numeric columns");
    match query::correlation_matrix(state.dataset()) {
        Analysis::Ready(matrix) => {
            egui::ScrollArea::horizontal()
                .id_salt("correlation")
                .show(ui, |ui: &mut Ui| plot::heatmap(ui, &matrix));
        }
        Analysis::NoData => plot::no_data(ui, "No data."),
    }
}

fn evolution_panel(ui: &mut Ui, state: &DashboardState) {
    section(ui, "Salary evolution of the 10 most common jobs");
    match query::salary_evolution_top_jobs(state.dataset()) {
        Analysis::Ready(series) => plot::line_chart(
            ui,
            "evolution_lines",
            &series,
            Column::WorkYear.name(),
            "mean salary_in_usd",
        ),
        Analysis::NoData => plot::no_data(ui, "No data."),
    }
}

fn median_panel(ui: &mut Ui, state: &DashboardState) {
    section(ui, "Median salary by experience and company size");
    match query::median_salary_by_experience_and_size(state.dataset()) {
        Analysis::Ready(result) => plot::grouped_bar_chart(
            ui,
            "median_bars",
            &result,
            Column::ExperienceLevel,
            Column::CompanySize,
            "median salary_in_usd",
        ),
        Analysis::NoData => plot::no_data(ui, "No data."),
    }
}

fn salary_range_panel(ui: &mut Ui, state: &mut DashboardState) {
    section(ui, "Filter by salary");

    let Some((min, max)) = query::salary_bounds(state.dataset()) else {
        plot::no_data(ui, "The dataset has no rows.");
        return;
    };

    let low = ui.add(egui::Slider::new(&mut state.salary_range.0, min..=max).text("from (USD)"));
    let high = ui.add(egui::Slider::new(&mut state.salary_range.1, min..=max).text("to (USD)"));
    if low.changed() || high.changed() {
        state.normalise_salary_range();
    }

    let (low, high) = state.salary_range;
    let result = query::filter_by_salary_range(state.dataset(), low, high);
    row_count(ui, result.count);
    if result.count == 0 {
        plot::no_data(ui, "No salary in this range.");
    } else {
        table::record_table(ui, "salary_range_rows", &result.rows);
    }
}

fn remote_panel(ui: &mut Ui, state: &DashboardState) {
    section(ui, "Remote work impact in the 5 most common countries");
    match query::remote_impact_top_countries(state.dataset()) {
        Analysis::Ready(result) => plot::grouped_bar_chart(
            ui,
            "remote_bars",
            &result,
            Column::CompanyLocation,
            Column::RemoteRatio,
            "mean salary_in_usd",
        ),
        Analysis::NoData => plot::no_data(ui, "No data."),
    }
}

fn advanced_filter_panel(ui: &mut Ui, state: &mut DashboardState) {
    section(ui, "Advanced filtering");

    ui.columns(2, |cols| {
        multi_select(&mut cols[0], state, Column::ExperienceLevel, "Experience level");
        multi_select(&mut cols[1], state, Column::CompanySize, "Company size");
    });

    let levels = state.selected(Column::ExperienceLevel);
    let sizes = state.selected(Column::CompanySize);
    let result = query::advanced_filter(state.dataset(), &levels, &sizes);
    row_count(ui, result.count);
    if result.count == 0 {
        plot::no_data(ui, "No record matches the selection.");
    } else {
        table::record_table(ui, "advanced_rows", &result.rows);
    }
}

// ---------------------------------------------------------------------------
// Multi-select widget
// ---------------------------------------------------------------------------

fn multi_select(ui: &mut Ui, state: &mut DashboardState, column: Column, title: &str) {
    let options = state.dataset().unique_values(column);
    let selected = state.selected(column);

    ui.strong(format!("{title}  ({}/{})", selected.len(), options.len()));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all(column);
        }
        if ui.small_button("None").clicked() {
            state.select_none(column);
        }
    });

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for value in &options {
            let mut checked = selected.contains(value);
            if ui.checkbox(&mut checked, value.to_string()).changed() {
                state.toggle_selection(column, value);
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top status bar.
pub fn top_bar(ui: &mut Ui, state: &DashboardState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.label(RichText::new("Salary Dashboard").strong());
        ui.separator();
        ui.label(format!(
            "{} records loaded from {}",
            state.dataset().len(),
            state.source.display()
        ));
    });
}
