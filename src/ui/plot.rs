use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Ui, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, PlotUi, Points,
};

use crate::color::{correlation_color, generate_palette, ColorMap};
use crate::data::aggregate::{AggregationResult, BoxStats, CorrelationMatrix, Series};
use crate::data::model::{Column, Value};

const PLOT_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Placeholder for a panel whose analysis matched no rows.
pub fn no_data(ui: &mut Ui, message: &str) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_height(60.0);
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(egui::RichText::new(message).italics().color(Color32::GRAY));
        });
    });
}

/// Show a plot whose x axis reads `labels[i]` at integer position `i`.
fn show_categorical(
    ui: &mut Ui,
    id: &str,
    labels: Vec<String>,
    x_label: &str,
    y_label: &str,
    add_contents: impl FnOnce(&mut PlotUi),
) {
    Plot::new(id.to_string())
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| add_contents(plot_ui));
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

/// One box per group, in the given order.
pub fn box_plot(ui: &mut Ui, id: &str, groups: &[(Value, Vec<f64>)], x_label: &str, y_label: &str) {
    let labels: Vec<String> = groups.iter().map(|(k, _)| k.to_string()).collect();
    let palette = generate_palette(groups.len());

    show_categorical(ui, id, labels, x_label, y_label, |plot_ui| {
        for (i, ((group, values), color)) in groups.iter().zip(palette).enumerate() {
            let Some(stats) = BoxStats::from_values(values) else {
                continue;
            };
            let spread = BoxSpread::new(
                stats.lower_whisker,
                stats.q1,
                stats.median,
                stats.q3,
                stats.upper_whisker,
            );
            let elem = BoxElem::new(i as f64, spread)
                .name(group.to_string())
                .box_width(0.5)
                .fill(color.gamma_multiply(0.4))
                .stroke(egui::Stroke::new(1.5, color));
            plot_ui.box_plot(BoxPlot::new(vec![elem]).name(group.to_string()).color(color));

            // Points beyond the whiskers.
            let outliers: PlotPoints = values
                .iter()
                .filter(|&&v| v < stats.lower_whisker || v > stats.upper_whisker)
                .map(|&v| [i as f64, v])
                .collect();
            plot_ui.points(Points::new(outliers).radius(2.5).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Bar charts
// ---------------------------------------------------------------------------

/// Single series of bars in the given order.
pub fn bar_chart(ui: &mut Ui, id: &str, pairs: &[(Value, f64)], x_label: &str, y_label: &str) {
    let labels: Vec<String> = pairs.iter().map(|(k, _)| k.to_string()).collect();
    let bars: Vec<Bar> = pairs
        .iter()
        .enumerate()
        .map(|(i, (key, value))| Bar::new(i as f64, *value).width(0.7).name(key.to_string()))
        .collect();

    show_categorical(ui, id, labels, x_label, y_label, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars).color(Color32::from_rgb(66, 133, 200)).name(y_label));
    });
}

/// Bars at each `x_column` value, one coloured bar per `group_column` value side by side.
pub fn grouped_bar_chart(
    ui: &mut Ui,
    id: &str,
    result: &AggregationResult,
    x_column: Column,
    group_column: Column,
    y_label: &str,
) {
    let series = result.series_by(group_column);
    let mut x_values: Vec<Value> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(x, _)| x.clone()))
        .collect();
    x_values.sort_by(|a, b| x_column.cmp_values(a, b));
    x_values.dedup();

    let labels: Vec<String> = x_values.iter().map(|v| v.to_string()).collect();
    let colors = ColorMap::new(series.iter().map(|s| &s.label));
    let width = 0.8 / series.len().max(1) as f64;

    show_categorical(ui, id, labels, x_column.name(), y_label, |plot_ui| {
        for (gi, s) in series.iter().enumerate() {
            let offset = (gi as f64 - (series.len() as f64 - 1.0) / 2.0) * width;
            let bars: Vec<Bar> = s
                .points
                .iter()
                .filter_map(|(x, y)| {
                    let xi = x_values.iter().position(|v| v == x)?;
                    Some(Bar::new(xi as f64 + offset, *y).width(width * 0.95))
                })
                .collect();
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name(format!("{} = {}", group_column.name(), s.label))
                    .color(colors.color_for(&s.label)),
            );
        }
    });
}

// ---------------------------------------------------------------------------
// Line chart
// ---------------------------------------------------------------------------

/// One line with markers per series; x must be numeric.
pub fn line_chart(ui: &mut Ui, id: &str, series: &[Series], x_label: &str, y_label: &str) {
    let colors = ColorMap::new(series.iter().map(|s| &s.label));

    Plot::new(id.to_string())
        .legend(Legend::default())
        .height(PLOT_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for s in series {
                let color = colors.color_for(&s.label);
                let name = s.label.to_string();
                let points: Vec<[f64; 2]> = s
                    .points
                    .iter()
                    .filter_map(|(x, y)| Some([x.as_f64()?, *y]))
                    .collect();

                plot_ui.line(Line::new(PlotPoints::from(points.clone())).name(&name).color(color).width(1.5));
                plot_ui.points(Points::new(points).name(&name).color(color).radius(3.0));
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// Square grid coloured on a diverging scale, undefined cells labelled "n/a".
pub fn heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.size();
    let cell = Vec2::new(110.0, 44.0);
    let label_width = 130.0;
    let header_height = 22.0;
    let font = FontId::proportional(13.0);
    let text_color = ui.visuals().text_color();

    let desired = Vec2::new(label_width + cell.x * n as f32, header_height + cell.y * n as f32);
    let (response, painter) = ui.allocate_painter(desired, Sense::hover());
    let origin = response.rect.min;

    for (j, col) in matrix.columns.iter().enumerate() {
        let pos = origin + Vec2::new(label_width + cell.x * (j as f32 + 0.5), header_height / 2.0);
        painter.text(pos, Align2::CENTER_CENTER, col.name(), font.clone(), text_color);
    }

    for (i, row_col) in matrix.columns.iter().enumerate() {
        let y = header_height + cell.y * i as f32;
        painter.text(
            origin + Vec2::new(label_width - 8.0, y + cell.y / 2.0),
            Align2::RIGHT_CENTER,
            row_col.name(),
            font.clone(),
            text_color,
        );

        for j in 0..n {
            let r = matrix.get(i, j);
            let min = origin + Vec2::new(label_width + cell.x * j as f32, y);
            let rect = Rect::from_min_size(min, cell).shrink(1.0);
            painter.rect_filled(rect, 2.0, correlation_color(r));

            let (label, ink) = match r {
                Some(r) if r.abs() > 0.6 => (format!("{r:.2}"), Color32::WHITE),
                Some(r) => (format!("{r:.2}"), Color32::BLACK),
                None => ("n/a".to_string(), Color32::LIGHT_GRAY),
            };
            painter.text(rect.center(), Align2::CENTER_CENTER, label, font.clone(), ink);
        }
    }
}
