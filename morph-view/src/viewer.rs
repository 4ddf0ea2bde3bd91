//! Interactive 2D mesh morph viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the morph state
//! (mesh, POIs, configuration, etc.) and implements [`eframe::App`]
//! to render and control the relaxation through an egui UI.

use eframe::App;
use glam::Vec2;
use morph_core::{
    config::MorphConfig,
    displacement::DisplacementBuffer,
    mesh::{Mesh, Topology, neighbor_lists},
    morph,
    pois::PoiSet,
    types::NodeId,
};
use rand::rng;

/// POI palette, cycled by POI index.
const POI_COLORS: [egui::Color32; 5] = [
    egui::Color32::from_rgb(0x21, 0x76, 0xAB),
    egui::Color32::from_rgb(0xF9, 0x76, 0x62),
    egui::Color32::from_rgb(0xFF, 0xBF, 0x00),
    egui::Color32::from_rgb(0x50, 0xC8, 0x78),
    egui::Color32::from_rgb(0xB2, 0x84, 0xBE),
];

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The morph core: [`Mesh`], [`PoiSet`], [`DisplacementBuffer`], [`MorphConfig`].
/// - UI configuration (pan/zoom, topology choice, timing).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, call [`Viewer::step_once`].
/// 3. Render the mesh edges, nodes, and POIs.
///
/// Stepping goes through [`morph::relaxation_step`] plus an explicit
/// [`DisplacementBuffer::apply_to`], rather than [`morph::morph`], so the
/// viewer can animate one iteration at a time.
pub struct Viewer {
    mesh: Mesh,
    neighbors: Vec<Vec<NodeId>>,
    pois: PoiSet,
    moves: DisplacementBuffer,
    cfg: MorphConfig,

    topology: Topology,
    resolution: usize,
    poi_count: usize,
    clamp_steps: bool,
    clamp: f32,

    rng: rand::rngs::ThreadRng,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    iterations: usize,
    last_max_min_d: f32,
    converged: bool,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a new viewer with a 20×20 square mesh and a handful of
    /// randomly scattered POIs inside the unit square.
    ///
    /// The camera starts centered on the unit square with no pan.
    pub fn new() -> Self {
        let mut rng = rng();
        let topology = Topology::Square;
        let resolution = 20;
        let mesh = topology.build(resolution);
        let neighbors = neighbor_lists(&mesh.edges, mesh.len());
        let moves = DisplacementBuffer::with_len(mesh.len());
        let pois = PoiSet::random_in_unit_square(5, &mut rng);
        let cfg = MorphConfig::default();
        let clamp = cfg.max_step.unwrap_or(0.05);

        Self {
            mesh,
            neighbors,
            pois,
            moves,
            cfg,
            topology,
            resolution,
            poi_count: 5,
            clamp_steps: cfg.max_step.is_some(),
            clamp,
            rng,
            running: false,
            zoom: 500.0,
            pan: egui::vec2(0.0, 0.0),
            iterations: 0,
            last_max_min_d: f32::NAN,
            converged: false,
            step_interval: 0.05,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        }
    }

    /// Installs a mesh and resizes everything derived from it.
    ///
    /// Neighbor lists and the displacement buffer are rebuilt, and the
    /// relaxation progress (iteration count, convergence state) is reset.
    /// The POI set and camera are kept.
    fn install_mesh(&mut self, mesh: Mesh) {
        self.neighbors = neighbor_lists(&mesh.edges, mesh.len());
        self.moves = DisplacementBuffer::with_len(mesh.len());
        self.mesh = mesh;
        self.iterations = 0;
        self.last_max_min_d = f32::NAN;
        self.converged = false;
        self.running = false;
    }

    /// Rebuilds the mesh from the currently selected topology and resolution.
    fn rebuild_mesh(&mut self) {
        self.install_mesh(self.topology.build(self.resolution.max(1)));
    }

    /// Replaces the POI set with `poi_count` random points in the unit square.
    fn scatter_pois(&mut self) {
        self.pois = PoiSet::random_in_unit_square(self.poi_count.max(1), &mut self.rng);
        self.converged = false;
    }

    /// Removes all POIs and stops the run (stepping needs at least one POI).
    fn clear_pois(&mut self) {
        self.pois.points.clear();
        self.converged = false;
        self.running = false;
    }

    /// Advances the relaxation by a single iteration.
    ///
    /// The step consists of:
    /// 1. [`morph::relaxation_step`] — record all displacements from the
    ///    current snapshot and measure the maximum nearest-POI distance.
    /// 2. [`DisplacementBuffer::apply_to`] — simultaneous write-back.
    ///
    /// Does nothing when there are no POIs or no mesh. Auto-running stops
    /// once the convergence threshold is met.
    fn step_once(&mut self) {
        if self.pois.is_empty() || self.mesh.is_empty() {
            return;
        }

        let max_min_d = morph::relaxation_step(
            &self.mesh.grid,
            &self.pois,
            &self.neighbors,
            &self.cfg,
            &mut self.moves,
        );
        self.moves.apply_to(&mut self.mesh.grid);

        self.iterations += 1;
        self.last_max_min_d = max_min_d;
        self.converged = max_min_d < self.cfg.threshold;
        if self.converged {
            self.running = false;
        }
    }

    /// Converts a world-space position to screen-space.
    ///
    /// The unit square is centered in `rect`, scaled by `zoom`, and offset
    /// by `pan`. The y-axis is flipped so that positive y goes up in
    /// world space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + (p.x - 0.5) * self.zoom + self.pan.x,
            center.y - (p.y - 0.5) * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding), using the same `zoom`, `pan`, and `rect` center.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        Vec2::new(
            (p.x - center.x - self.pan.x) / self.zoom + 0.5,
            (center.y - p.y + self.pan.y) / self.zoom + 0.5,
        )
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.01..=1.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset mesh").clicked() {
                    self.rebuild_mesh();
                }

                if ui.button("Scatter POIs").clicked() {
                    self.scatter_pois();
                }

                if ui.button("Clear POIs").clicked() {
                    self.clear_pois();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 50.0..=2000.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (iterations, convergence metric, counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt target = {:.3} s", self.step_interval));
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(if self.converged {
                    "converged"
                } else {
                    "not converged"
                });
                ui.label(format!("max min d = {:.5}", self.last_max_min_d));
                ui.label(format!("iterations = {}", self.iterations));
                ui.separator();
                ui.label(format!("pois = {}", self.pois.points.len()));
                ui.label(format!("edges = {}", self.mesh.edges.len()));
                ui.label(format!("nodes = {}", self.mesh.len()));
            });
        });
    }

    /// Builds the right-hand configuration panel for morph parameters.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Forces");
                Self::labeled_drag_f32(ui, "alpha:", &mut self.cfg.alpha, 0.0..=1.0, 0.005);
                Self::labeled_drag_f32(ui, "beta:", &mut self.cfg.beta, 0.0..=1.0, 0.005);

                ui.separator();
                ui.label("Convergence");
                Self::labeled_drag_f32(
                    ui,
                    "threshold:",
                    &mut self.cfg.threshold,
                    1e-5..=0.1,
                    0.0005,
                );
                Self::labeled_drag_usize(ui, "max_iter:", &mut self.cfg.max_iter, 1..=2000, 1.0);

                ui.separator();
                ui.label("Step clamp");
                ui.checkbox(&mut self.clamp_steps, "clamp steps");
                Self::labeled_drag_f32(ui, "max_step:", &mut self.clamp, 0.001..=0.5, 0.002);
                self.cfg.max_step = self.clamp_steps.then_some(self.clamp);

                ui.separator();
                ui.label("Mesh");
                ui.horizontal(|ui| {
                    if ui
                        .selectable_label(self.topology == Topology::Square, "■ Square")
                        .clicked()
                    {
                        self.topology = Topology::Square;
                    }
                    if ui
                        .selectable_label(self.topology == Topology::Circle, "○ Circle")
                        .clicked()
                    {
                        self.topology = Topology::Circle;
                    }
                });
                Self::labeled_drag_usize(ui, "resolution:", &mut self.resolution, 1..=60, 1.0);
                if ui.button("Rebuild mesh").clicked() {
                    self.rebuild_mesh();
                }

                ui.separator();
                ui.label("POIs");
                Self::labeled_drag_usize(ui, "poi_count:", &mut self.poi_count, 1..=50, 1.0);

                ui.separator();
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = MorphConfig::default();
                    self.clamp_steps = self.cfg.max_step.is_some();
                    self.clamp = self.cfg.max_step.unwrap_or(0.05);
                }
            });
    }

    /// Builds the central panel where the mesh and POIs are drawn and
    /// interacted with.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                let delta = response.drag_delta();
                self.pan += delta;
            }

            let hover_world = response.hover_pos().map(|p| self.screen_to_world(p, rect));

            // Click to place a POI, clamped to the unit square like the
            // rest of the scatter tools.
            if response.clicked()
                && let Some(p) = hover_world
            {
                self.pois
                    .points
                    .push(Vec2::new(p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0)));
                self.converged = false;
            }

            // Zoom around the mouse cursor.
            if ui.ctx().input(|i| i.raw_scroll_delta.y != 0.0) {
                let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let pointer_screen = response.hover_pos().unwrap_or(rect.center());

                    let world_before = self.screen_to_world(pointer_screen, rect);

                    let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                    let new_zoom = (self.zoom * factor).clamp(50.0, 2000.0);
                    self.zoom = new_zoom;

                    let screen_after = self.world_to_screen(world_before, rect);

                    let delta = pointer_screen - screen_after;
                    self.pan += delta;
                }
            }

            // Draw mesh edges.
            for &[a, b] in &self.mesh.edges {
                let pa = self.world_to_screen(self.mesh.grid[a], rect);
                let pb = self.world_to_screen(self.mesh.grid[b], rect);
                painter.line_segment([pa, pb], egui::Stroke::new(1.0, egui::Color32::GRAY));
            }

            // Draw mesh nodes.
            for &p in &self.mesh.grid {
                let pos = self.world_to_screen(p, rect);
                painter.circle_filled(pos, 2.0, egui::Color32::LIGHT_BLUE);
            }

            // Draw POIs in the palette order.
            for (j, &q) in self.pois.points.iter().enumerate() {
                let pos = self.world_to_screen(q, rect);
                painter.circle_filled(pos, 6.0, POI_COLORS[j % POI_COLORS.len()]);
            }

            // Auto-run the relaxation if requested, within the budget.
            if self.running {
                if self.iterations >= self.cfg.max_iter {
                    self.running = false;
                } else {
                    let now = ctx.input(|i| i.time);
                    let elapsed = now - self.last_step_time;
                    if elapsed >= self.step_interval {
                        if self.last_step_time > 0.0 {
                            self.last_step_dt = elapsed;
                        }
                        self.step_once();
                        self.last_step_time = now;
                    }

                    ctx.request_repaint();
                }
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    ///
    /// This method:
    /// - Renders the top control bar and status bar.
    /// - Renders the config side panel.
    /// - Draws the central mesh view and handles interactions.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
