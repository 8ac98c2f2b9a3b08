use eframe::{
    egui::{self, Key},
    epaint::Color32,
};
use egui_plot::{self, *};
use pipbench_core::{Family, HarnessConfig, Registry};
use rgeometry::data::Point;

mod family;

pub fn plot_line(plot_ui: &mut PlotUi, points: &[&Point<f64>], color: Color32) {
    let e_points = points.iter().map(|p| pt_egui(p)).collect();
    plot_ui.line(egui_plot::Line::new(PlotPoints::Owned(e_points)).color(color));
}

/// Closed outline through `ring`.
pub fn plot_ring(plot_ui: &mut PlotUi, ring: &[Point<f64>], color: Color32) {
    let mut refs: Vec<&Point<f64>> = ring.iter().collect();
    if let Some(first) = ring.first() {
        refs.push(first);
    }
    plot_line(plot_ui, &refs, color);
}

pub fn plot_points(plot_ui: &mut PlotUi, points: Vec<PlotPoint>, color: Color32, radius: f32, name: &str) {
    if points.is_empty() {
        return;
    }
    plot_ui.points(
        egui_plot::Points::new(PlotPoints::Owned(points))
            .color(color)
            .radius(radius)
            .name(name),
    );
}

pub fn pt_egui(p: &Point<f64>) -> PlotPoint {
    let [x, y] = p.array;
    PlotPoint::new(x, y)
}

trait Demo {
    fn name(&self) -> &'static str;
    fn ui(&mut self, ctx: &egui::Context, ui: &mut egui::Ui);
    fn plot_ui(&self, plot_ui: &mut PlotUi);
}

pub struct MyApp {
    view: f64,

    selected: &'static str,
    demos: Vec<Box<dyn Demo>>,
}

impl MyApp {
    pub fn new(config: &HarnessConfig) -> Self {
        let view = 30f64;
        let registry = Registry::builtin();

        let demos: Vec<Box<dyn Demo>> = registry
            .families()
            .into_iter()
            .map(|f| Box::new(family::DemoFamily::new(f, &registry, config, view)) as Box<dyn Demo>)
            .collect();

        let selected = demos
            .iter()
            .map(|d| d.name())
            .find(|n| *n == config.family.name())
            .or_else(|| demos.first().map(|d| d.name()))
            .unwrap_or(Family::Polygon.name());

        Self {
            view,
            selected,
            demos,
        }
    }
}

impl Default for MyApp {
    fn default() -> Self {
        Self::new(&HarnessConfig::default())
    }
}

impl eframe::App for MyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let view = self.view;

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("shortcuts: (R) regenerate shape | (B) run benchmark | (Tab) next family");
            });

            ui.horizontal(|ui| {
                ui.visuals_mut().button_frame = false;
                for d in &self.demos {
                    let name = d.name();
                    if ui.selectable_label(self.selected == name, name).clicked() {
                        self.selected = name;
                    }
                    ui.separator();
                }
            });
        });

        if ctx.input(|i| i.key_pressed(Key::Tab)) {
            if let Some(pos) = self.demos.iter().position(|d| d.name() == self.selected) {
                self.selected = self.demos[(pos + 1) % self.demos.len()].name();
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            for demo in &mut self.demos {
                if demo.name() == self.selected {
                    demo.ui(ctx, ui);
                }
            }

            let plot = Plot::new(0)
                .legend(Legend::default())
                .data_aspect(1.0)
                .allow_zoom(true)
                .allow_drag(true);

            plot.show(ui, |plot_ui| {
                for demo in &self.demos {
                    if demo.name() == self.selected {
                        demo.plot_ui(plot_ui);
                    }
                }

                let area = view;
                plot_ui.points(
                    egui_plot::Points::new(PlotPoints::Owned(vec![
                        PlotPoint::new(-area, -area),
                        PlotPoint::new(area, -area),
                        PlotPoint::new(-area, area),
                        PlotPoint::new(area, area),
                    ]))
                    .color(Color32::WHITE),
                );
            });
        });
    }
}
