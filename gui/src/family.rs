use eframe::egui::{self, epaint::Color32, Key, Ui};
use egui_plot::PlotUi;
use pipbench_core::{
    classify, gen_shape, BenchmarkSession, Classification, ClassificationRecord, Family,
    HarnessConfig, Membership, Registry, ReportRow, RowStatus, Shape, ShapeCandidate,
};
use rand::prelude::*;
use rand_chacha::ChaCha20Rng;
use rgeometry::data::Point;

use super::{plot_points, plot_ring, pt_egui, Demo};

/// Classification view and benchmark table for one predicate family.
pub struct DemoFamily {
    family: Family,
    view: f64,

    opt_collapsed: bool,
    opt_disagreements_only: bool,

    registry: Registry,
    candidates: Vec<ShapeCandidate>,
    selected: usize,

    shape: Shape,
    points: Vec<Point<f64>>,
    record: ClassificationRecord,
    disagreements: Vec<usize>,

    trials: u64,
    session: BenchmarkSession,
    rows: Vec<ReportRow>,

    rng: ChaCha20Rng,
}

impl DemoFamily {
    pub fn new(family: Family, registry: &Registry, config: &HarnessConfig, view: f64) -> Self {
        let candidates = registry.discover(family);
        let shape = family.default_shape();
        let points = config.grid.points();
        let record = classify(&candidates, &shape, &points);

        let mut demo = Self {
            family,
            view,

            opt_collapsed: false,
            opt_disagreements_only: false,

            registry: registry.clone(),
            candidates,
            selected: 0,

            shape,
            points,
            record,
            disagreements: Vec::new(),

            trials: config.trials,
            session: BenchmarkSession::new(family, config.trials),
            rows: Vec::new(),

            rng: ChaCha20Rng::seed_from_u64(family as u64),
        };
        demo.refresh();
        demo
    }

    fn mode(&self) -> Membership {
        if self.opt_collapsed {
            Membership::Collapsed
        } else {
            Membership::Exact
        }
    }

    fn refresh(&mut self) {
        self.record = classify(&self.candidates, &self.shape, &self.points);
        self.disagreements = self.record.disagreements(self.mode());
        // results belong to the previous shape
        self.session.set_candidates(Vec::new());
        self.rows.clear();
    }

    fn regenerate(&mut self) {
        self.shape = gen_shape(&mut self.rng, self.family, self.view);
        self.refresh();
    }

    fn run_benchmark(&mut self) {
        self.session.set_trials(self.trials);
        self.session
            .set_candidates(self.registry.timing_candidates(self.family, &self.shape, &self.points));
        self.session.run_all();
        self.rows = self.session.rows();
    }

    fn results_ui(&self, ui: &mut Ui) {
        egui::Grid::new(("results", self.family.name()))
            .striped(true)
            .show(ui, |ui| {
                ui.strong("candidate");
                ui.strong("total ms");
                ui.strong("average ms");
                ui.strong("");
                ui.end_row();

                for r in &self.rows {
                    ui.label(r.name.as_str());
                    match r.status {
                        RowStatus::Completed => {
                            ui.label(r.total_ms.map_or("-".to_string(), |t| t.to_string()));
                            ui.label(r.average_ms.map_or("-".to_string(), |a| format!("{a:.6}")));
                            if r.fastest {
                                ui.colored_label(Color32::GREEN, "fastest");
                            } else if r.slowest {
                                ui.colored_label(Color32::LIGHT_RED, "slowest");
                            } else {
                                ui.label("");
                            }
                        }
                        RowStatus::Failed => {
                            ui.label("-");
                            ui.label("-");
                            ui.colored_label(
                                Color32::RED,
                                format!("failed: {}", r.reason.as_deref().unwrap_or("unknown")),
                            );
                        }
                        RowStatus::Skipped => {
                            ui.label("-");
                            ui.label("-");
                            ui.label("skipped");
                        }
                    }
                    ui.end_row();
                }
            });
    }
}

impl Demo for DemoFamily {
    fn name(&self) -> &'static str {
        self.family.name()
    }

    fn ui(&mut self, ctx: &egui::Context, ui: &mut Ui) {
        let mut regen = ctx.input(|i| i.key_pressed(Key::R));
        let mut run = ctx.input(|i| i.key_pressed(Key::B));
        let mut reclassify = false;

        ui.horizontal(|ui| {
            if ui.button("regenerate").clicked() {
                regen = true;
            }
            ui.separator();

            let selected_name = self.candidates.get(self.selected).map_or("-", |c| c.name);
            egui::ComboBox::from_label("candidate")
                .selected_text(selected_name)
                .show_ui(ui, |ui| {
                    for (i, c) in self.candidates.iter().enumerate() {
                        ui.selectable_value(&mut self.selected, i, c.name);
                    }
                });
            ui.separator();

            if ui.checkbox(&mut self.opt_collapsed, "boundary = inside").changed() {
                reclassify = true;
            }
            ui.checkbox(&mut self.opt_disagreements_only, "disagreements only");
            ui.separator();

            ui.label("trials");
            ui.add(egui::DragValue::new(&mut self.trials).speed(1000.0));
            if ui.button("run benchmark").clicked() {
                run = true;
            }
        });

        if reclassify {
            self.disagreements = self.record.disagreements(self.mode());
        }
        if regen {
            self.regenerate();
        }
        if run {
            // zero trials still runs, it just reports no average
            self.run_benchmark();
        }

        ui.label(format!(
            "{} points, {} candidates, {} disagreeing points",
            self.record.point_count(),
            self.candidates.len(),
            self.disagreements.len()
        ));

        if !self.rows.is_empty() {
            self.results_ui(ui);
        }
    }

    fn plot_ui(&self, plot_ui: &mut PlotUi) {
        plot_ring(plot_ui, &self.shape.outline(), Color32::RED);

        let mut inside = Vec::new();
        let mut boundary = Vec::new();
        let mut outside = Vec::new();

        if !self.opt_disagreements_only {
            if let Some(c) = self.candidates.get(self.selected) {
                if let Some(labels) = self.record.labels(c.name) {
                    for (p, label) in self.points.iter().zip(labels) {
                        let bucket = match label {
                            Classification::Inside => &mut inside,
                            Classification::Boundary => &mut boundary,
                            Classification::Outside => &mut outside,
                        };
                        bucket.push(pt_egui(p));
                    }
                }
            }
        }

        let disagree = self.disagreements.iter().map(|&i| pt_egui(&self.points[i])).collect();

        plot_points(plot_ui, outside, Color32::LIGHT_BLUE, 1.5, "outside");
        plot_points(plot_ui, inside, Color32::LIGHT_RED, 1.5, "inside");
        plot_points(plot_ui, boundary, Color32::GREEN, 2.0, "boundary");
        plot_points(plot_ui, disagree, Color32::YELLOW, 4.0, "disagreement");
    }
}
