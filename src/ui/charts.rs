use std::collections::{BTreeMap, BTreeSet};
use std::f32::consts::{FRAC_PI_4, TAU};

use eframe::egui::{Align2, Color32, FontId, Sense, Shape, Stroke, Ui, Vec2};
use egui_extras::{Size, StripBuilder};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoints, Points};

use trade_dashboard::data::aggregate::{
    CategoryTotal, DashboardView, DirectionCount, Histogram, MonthlyAverage, ScatterPoint,
    YearlyDistribution,
};
use trade_dashboard::data::model::Direction;
use trade_dashboard::state::AppState;

use crate::color::{ChartColors, IMPORT_COLOR};

const WARNING_COLOR: Color32 = Color32::from_rgb(0xe6, 0xa2, 0x3c);

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the title and the 3×2 chart grid, or the no-data notice.
pub fn dashboard(ui: &mut Ui, state: &AppState, colors: &ChartColors) {
    ui.heading("Imports and Exports Dashboard");
    ui.separator();

    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view transactions  (File → Open…)");
        });
        return;
    }

    let charts = match state.view() {
        DashboardView::Charts(charts) => charts,
        DashboardView::NoData => {
            if let Some(notice) = state.view().notice() {
                ui.colored_label(WARNING_COLOR, format!("⚠ {notice}"));
            }
            return;
        }
    };

    StripBuilder::new(ui)
        .sizes(Size::remainder(), 3)
        .vertical(|mut rows| {
            rows.strip(|row| {
                row.sizes(Size::remainder(), 2).horizontal(|mut cells| {
                    cells.cell(|ui| {
                        titled(ui, "Import vs Export Transactions", |ui| {
                            direction_pie(ui, &charts.directions, colors)
                        })
                    });
                    cells.cell(|ui| {
                        titled(ui, "Export/Import Distribution by Year", |ui| {
                            yearly_box_plot(ui, &charts.yearly, colors)
                        })
                    });
                });
            });
            rows.strip(|row| {
                row.sizes(Size::remainder(), 2).horizontal(|mut cells| {
                    cells.cell(|ui| {
                        titled(ui, "Histogram of Transaction Values", |ui| {
                            value_histogram(ui, &charts.histogram)
                        })
                    });
                    cells.cell(|ui| {
                        titled(ui, "Scatter Plot: Value vs Year", |ui| {
                            value_scatter(ui, &charts.scatter, colors)
                        })
                    });
                });
            });
            rows.strip(|row| {
                row.sizes(Size::remainder(), 2).horizontal(|mut cells| {
                    cells.cell(|ui| {
                        titled(ui, "Transactions by Category", |ui| {
                            category_bars(ui, &charts.categories, colors)
                        })
                    });
                    cells.cell(|ui| {
                        titled(ui, "Average Monthly Transaction Value", |ui| {
                            monthly_line(ui, &charts.monthly)
                        })
                    });
                });
            });
        });
}

fn titled(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    ui.vertical(|ui: &mut Ui| {
        ui.strong(title);
        add_contents(ui);
    });
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

/// Pie of direction shares, labelled with one-decimal percentages.
fn direction_pie(ui: &mut Ui, counts: &[DirectionCount], colors: &ChartColors) {
    let text_color = ui.visuals().text_color();
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::hover());
    let rect = response.rect;
    let center = rect.center();
    let radius = rect.width().min(rect.height()) * 0.38;

    let mut start = 0.0_f32;
    for slice in counts {
        let sweep = (slice.share / 100.0) as f32 * TAU;
        let color = colors.direction(&slice.direction);

        // Wedges of at most 45° stay convex.
        let wedges = ((sweep / FRAC_PI_4).ceil() as usize).max(1);
        for w in 0..wedges {
            let a0 = start + sweep * w as f32 / wedges as f32;
            let a1 = start + sweep * (w + 1) as f32 / wedges as f32;
            let mut points = vec![center];
            points.extend(
                (0..=8).map(|k| center + radius * Vec2::angled(a0 + (a1 - a0) * k as f32 / 8.0)),
            );
            painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
        }

        let mid = Vec2::angled(start + sweep / 2.0);
        painter.text(
            center + radius * 0.6 * mid,
            Align2::CENTER_CENTER,
            format!("{:.1}%", slice.share),
            FontId::proportional(14.0),
            Color32::WHITE,
        );
        painter.text(
            center + radius * 1.2 * mid,
            Align2::CENTER_CENTER,
            slice.direction.to_string(),
            FontId::proportional(14.0),
            text_color,
        );
        start += sweep;
    }
}

/// Value box plots per year, one box per direction side by side.
fn yearly_box_plot(ui: &mut Ui, yearly: &[YearlyDistribution], colors: &ChartColors) {
    let directions: BTreeSet<&Direction> = yearly
        .iter()
        .flat_map(|y| y.by_direction.iter().map(|d| &d.direction))
        .collect();
    let slot = 0.8 / directions.len().max(1) as f64;
    let offset = |dir: &Direction| {
        let pos = directions.iter().position(|d| *d == dir).unwrap_or(0) as f64;
        (pos - (directions.len() as f64 - 1.0) / 2.0) * slot
    };

    let mut boxes: BTreeMap<&Direction, Vec<BoxElem>> = BTreeMap::new();
    let mut outliers: BTreeMap<&Direction, Vec<[f64; 2]>> = BTreeMap::new();
    for year in yearly {
        for entry in &year.by_direction {
            let s = &entry.summary;
            let x = year.year as f64 + offset(&entry.direction);
            boxes.entry(&entry.direction).or_default().push(
                BoxElem::new(
                    x,
                    BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
                )
                .box_width(slot * 0.9)
                .name(format!("{} {}", entry.direction, year.year)),
            );
            outliers
                .entry(&entry.direction)
                .or_default()
                .extend(s.outliers.iter().map(|&v| [x, v]));
        }
    }

    Plot::new("yearly_box_plot")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Value")
        .show(ui, |plot_ui| {
            for (dir, elems) in boxes {
                let color = colors.direction(dir);
                plot_ui.box_plot(BoxPlot::new(elems).name(dir.to_string()).color(color));
                if let Some(points) = outliers.remove(dir) {
                    plot_ui.points(
                        Points::new(PlotPoints::from(points))
                            .name(dir.to_string())
                            .color(color)
                            .radius(2.0),
                    );
                }
            }
        });
}

fn value_histogram(ui: &mut Ui, hist: &Histogram) {
    let width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            Bar::new(hist.center(i), count as f64)
                .width(width)
                .stroke(Stroke::new(1.0, Color32::BLACK))
        })
        .collect();

    Plot::new("value_histogram")
        .x_axis_label("Transaction Value")
        .y_axis_label("Frequency")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Frequency").color(IMPORT_COLOR));
        });
}

fn value_scatter(ui: &mut Ui, points: &[ScatterPoint], colors: &ChartColors) {
    let mut series: BTreeMap<&Direction, Vec<[f64; 2]>> = BTreeMap::new();
    for p in points {
        series.entry(&p.direction).or_default().push([p.year as f64, p.value]);
    }

    Plot::new("value_scatter")
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Value")
        .show(ui, |plot_ui| {
            for (dir, pts) in series {
                plot_ui.points(
                    Points::new(PlotPoints::from(pts))
                        .name(dir.to_string())
                        .color(colors.direction(dir))
                        .radius(3.0),
                );
            }
        });
}

/// One bar per category, each in its own colour with a legend entry.
fn category_bars(ui: &mut Ui, totals: &[CategoryTotal], colors: &ChartColors) {
    Plot::new("category_totals")
        .legend(Legend::default())
        .x_axis_label("Category")
        .y_axis_label("Value")
        .show(ui, |plot_ui| {
            for (i, ct) in totals.iter().enumerate() {
                let bar = Bar::new(i as f64, ct.total).width(0.7).name(&ct.category);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .name(&ct.category)
                        .color(colors.category(&ct.category)),
                );
            }
        });
}

/// Mean value per month. Consecutive months are joined; a missing month
/// breaks the line.
fn monthly_line(ui: &mut Ui, monthly: &[MonthlyAverage]) {
    let mut runs: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut prev: Option<u32> = None;
    for m in monthly {
        if prev.map_or(true, |p| p + 1 != m.month) {
            runs.push(Vec::new());
        }
        if let Some(run) = runs.last_mut() {
            run.push([m.month as f64, m.mean]);
        }
        prev = Some(m.month);
    }
    let markers: Vec<[f64; 2]> = monthly.iter().map(|m| [m.month as f64, m.mean]).collect();

    Plot::new("monthly_average")
        .x_axis_label("Month")
        .y_axis_label("Value")
        .include_x(1.0)
        .include_x(12.0)
        .show(ui, |plot_ui| {
            for run in runs {
                plot_ui.line(Line::new(PlotPoints::from(run)).color(IMPORT_COLOR).width(2.0));
            }
            plot_ui.points(
                Points::new(PlotPoints::from(markers))
                    .name("Average value")
                    .color(IMPORT_COLOR)
                    .filled(true)
                    .radius(4.0),
            );
        });
}
