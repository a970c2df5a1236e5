use eframe::egui::{self, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::aggregate::{ColumnSummary, STATISTICS};
use crate::data::model::{Column, Record};

const ROW_HEIGHT: f32 = 18.0;
const MAX_TABLE_HEIGHT: f32 = 360.0;

/// All eleven columns of `rows`, one line per record.
pub fn record_table(ui: &mut Ui, id: &str, rows: &[&Record]) {
    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(MAX_TABLE_HEIGHT)
                .column(TableColumn::auto().at_least(30.0))
                .columns(TableColumn::auto().at_least(60.0), Column::ALL.len())
                .header(ROW_HEIGHT + 2.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                    for col in Column::ALL {
                        header.col(|ui| {
                            ui.strong(col.name());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let idx = row.index();
                        let record = rows[idx];
                        row.col(|ui| {
                            ui.label(idx.to_string());
                        });
                        for col in Column::ALL {
                            row.col(|ui| {
                                ui.label(record.value(col).to_string());
                            });
                        }
                    });
                });
        });
    });
}

/// `describe()`-style table: one column per summarized field, one line per statistic.
pub fn summary_table(ui: &mut Ui, id: &str, summaries: &[ColumnSummary]) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(TableColumn::auto().at_least(50.0))
            .columns(TableColumn::auto().at_least(110.0), summaries.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                header.col(|_ui| {});
                for s in summaries {
                    header.col(|ui| {
                        ui.strong(s.column.name());
                    });
                }
            })
            .body(|mut body| {
                for (i, label) in STATISTICS.iter().enumerate() {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            ui.strong(*label);
                        });
                        for s in summaries {
                            let text = match s.values()[i] {
                                Some(v) => format!("{v:.2}"),
                                None => "NaN".to_string(),
                            };
                            row.col(|ui| {
                                ui.label(text);
                            });
                        }
                    });
                }
            });
    });
}
