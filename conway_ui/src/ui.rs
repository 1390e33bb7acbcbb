// ui.rs - Controls and board for GameOfLife. All simulation state lives in the engine.

use std::time::Duration;

use conway::{PATTERNS, RunState, SPEED_PRESETS_MS};
use eframe::egui;
use egui::{Color32, Pos2, Rect, Stroke, Vec2};

use crate::GameOfLife;

const BOX_SIZE: f32 = 20.0;
const LIVE_COLOR: Color32 = Color32::from_rgb(0x20, 0x46, 0x64);
const DEAD_COLOR: Color32 = Color32::from_rgb(211, 211, 211);

impl eframe::App for GameOfLife {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let snapshot = self.sim.snapshot();
        let running = snapshot.run_state == RunState::Running;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Conway's Game of Life");
            ui.label(format!("Generation#: {}", snapshot.generation));

            // Controls
            ui.horizontal(|ui| {
                let button_text = if running { "⏸ Stop" } else { "▶ Start" };
                if ui.button(button_text).clicked() {
                    if running {
                        self.sim.stop();
                    } else {
                        self.sim.start();
                    }
                }

                if ui.button("🎲 Randomize").clicked() {
                    self.sim.randomize();
                }

                if ui.button("⏹ Erase grid").clicked() {
                    self.sim.clear();
                }

                if ui.add_enabled(!running, egui::Button::new("Step")).clicked() {
                    self.sim.step_once();
                }

                ui.separator();

                ui.label("Speed:");
                let mut speed = snapshot.speed_ms;
                egui::ComboBox::from_id_source("speed_selector")
                    .selected_text(format!("{speed} ms"))
                    .show_ui(ui, |ui| {
                        for ms in SPEED_PRESETS_MS {
                            ui.selectable_value(&mut speed, ms, format!("{ms} ms"));
                        }
                    });
                if speed != snapshot.speed_ms {
                    if let Err(err) = self.sim.set_speed(speed) {
                        log::warn!("speed not changed: {err}");
                    }
                }
            });

            // Pattern dropdown
            ui.horizontal(|ui| {
                ui.label("Pattern:");
                egui::ComboBox::from_id_source("pattern_selector")
                    .selected_text(PATTERNS[self.selected_pattern].name)
                    .show_ui(ui, |ui| {
                        for (i, pattern) in PATTERNS.iter().enumerate() {
                            ui.selectable_value(&mut self.selected_pattern, i, pattern.name);
                        }
                    });

                if ui.button("Apply Pattern").clicked() {
                    self.sim.load_pattern(&PATTERNS[self.selected_pattern]);
                }
            });

            ui.separator();

            let grid = &snapshot.grid;
            let size = Vec2::new(
                BOX_SIZE * grid.cols() as f32,
                BOX_SIZE * grid.rows() as f32,
            );
            let (response, painter) = ui.allocate_painter(size, egui::Sense::click());
            let origin = response.rect.min;

            for (row, cells) in grid.iter_rows().enumerate() {
                for (col, &alive) in cells.iter().enumerate() {
                    let rect = cell_rect(origin, row, col);
                    let color = if alive { LIVE_COLOR } else { DEAD_COLOR };
                    painter.rect_filled(rect, 0.0, color);
                    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, Color32::BLACK));
                }
            }

            // Cells can be drawn while the simulation runs; the next tick sees them.
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    let offset = pos - origin;
                    let (row, col) = ((offset.y / BOX_SIZE) as usize, (offset.x / BOX_SIZE) as usize);
                    if let Err(err) = self.sim.toggle_cell(row, col) {
                        log::debug!("click outside the board: {err}");
                    }
                }
            }

            ui.separator();

            let cells = grid.rows() * grid.cols();
            let live_cells = grid.population();
            ui.horizontal(|ui| {
                ui.label(format!("Live cells: {}", live_cells));
                ui.label(format!("Dead cells: {}", cells - live_cells));
                ui.label(format!(
                    "Population: {:.1}%",
                    live_cells as f32 / cells as f32 * 100.0
                ));
            });
        });

        // Ticks happen off the UI thread, keep polling while running.
        if running {
            ctx.request_repaint_after(Duration::from_millis(snapshot.speed_ms.min(50)));
        }
    }
}

fn cell_rect(origin: Pos2, row: usize, col: usize) -> Rect {
    let min = origin + Vec2::new(col as f32 * BOX_SIZE, row as f32 * BOX_SIZE);
    Rect::from_min_size(min, Vec2::splat(BOX_SIZE))
}
