// main.rs - Window for drawing cells and driving a Game of Life simulation

use std::error::Error;

use conway::{SimConfig, Simulation};
use eframe::egui;

mod ui;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = GameOfLife::new(SimConfig::default())?;
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([620.0, 760.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Conway's Game of Life",
        options,
        Box::new(move |_cc| Box::new(app)),
    )?;
    Ok(())
}

pub struct GameOfLife {
    sim: Simulation,
    pub selected_pattern: usize,

    // Declared after `sim` so the tick loop is stopped before the runtime goes away.
    _runtime: tokio::runtime::Runtime,
}

impl GameOfLife {
    pub fn new(config: SimConfig) -> Result<Self, Box<dyn Error>> {
        let runtime = tokio::runtime::Runtime::new()?;
        let sim = Simulation::with_handle(config, runtime.handle().clone())?;
        log::info!("{}x{} board ready", config.rows, config.cols);

        Ok(Self {
            sim,
            selected_pattern: 0,
            _runtime: runtime,
        })
    }
}
