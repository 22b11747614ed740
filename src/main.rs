mod config; // simulator settings, robots and fields from config/default.toml
mod field; // obstacle sets and field cycling
mod gamepad; // gilrs stick polling
mod graphics; // macroquad window, input capture and drawing
mod input; // input snapshot -> drive commands and menu actions
mod sim; // frame gate and per-tick simulation state

use gamepad::GamepadInput;
use graphics::window_conf;
use sim::{FrameGate, Simulator};

use macroquad::prelude::*;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

#[macroquad::main(window_conf)]
async fn main() {
    let level = tracing::Level::INFO.into();
    let filter = EnvFilter::from_default_env().add_directive(level);
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Field simulator started.");

    match run().await {
        Ok(()) => info!("Simulation finished."),
        Err(e) => error!("Simulation failed: {:?}", e),
    }
}

async fn run() -> anyhow::Result<()> {
    let config = crate::config::load_config()?;
    let mut sim = Simulator::from_config(&config)?;
    let textures = graphics::load_field_textures(sim.fields()).await;
    let mut gate = FrameGate::new(config.sim.fps);
    let mut gamepad = GamepadInput::new();

    info!(fps = config.sim.fps, "Entering frame loop");
    loop {
        if let Some(dt) = gate.poll(get_time()) {
            let input = graphics::capture_input(gamepad.poll());
            sim.tick(&input, dt)?;
        }

        graphics::draw_frame(&sim, &textures);
        next_frame().await
    }
}
