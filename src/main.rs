mod blackboard; // the co-simulated scene shared with the renderer
mod bus;
mod config;
mod graphics;
mod mission;
mod monitor;
mod scene;

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context;
use obocar_vehicle::Vehicle;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use blackboard::Blackboard;
use bus::{Telemetry, Topic};
use crate::config::AppConfig;
use mission::{MissionReport, Pilot};
use scene::SceneRenderer;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = config::load_config().context("loading configuration")?;
    info!(
        bridged = config.runner.bridged,
        visualize = config.runner.visualize,
        "Obocar started"
    );

    let bb: Blackboard = Arc::default();
    let vehicle = build_vehicle(&config, &bb)?;
    info!(mode = ?vehicle.mode(), "Vehicle ready");

    let telemetry: Topic<Telemetry> = Topic::new(config.runner.topic_capacity);
    let monitor_rx = telemetry.subscribe();
    let vis_rx = config.runner.visualize.then(|| telemetry.subscribe());

    let mission = spawn_mission(vehicle, &config, telemetry)?;

    let tokio_rt = tokio::runtime::Runtime::new()?;
    let monitor = monitor::run(
        Arc::clone(&bb),
        monitor_rx,
        Duration::from_millis(config.runner.stall_timeout_ms),
        Duration::from_millis(config.runner.watchdog_ms.max(1)),
    );

    match vis_rx {
        Some(rx) => {
            tokio_rt.spawn(async move {
                if let Err(e) = monitor.await {
                    error!("Monitor task failed: {:?}", e);
                }
            });
            macroquad::Window::from_config(graphics::window_conf(), graphics::run_visualization_loop(rx));
        }
        None => tokio_rt.block_on(monitor)?,
    }

    let report = mission
        .join()
        .map_err(|_| anyhow::anyhow!("mission thread panicked"))?;
    info!(
        commands = report.commands,
        x = report.status.position.0,
        y = report.status.position.1,
        heading = report.status.heading,
        battery = report.status.battery,
        distance = report.status.distance,
        "Obocar finished"
    );
    Ok(())
}

fn build_vehicle(config: &AppConfig, bb: &Blackboard) -> anyhow::Result<Vehicle> {
    let vehicle = if config.runner.bridged {
        let renderer = SceneRenderer::new(
            Arc::clone(bb),
            config.runner.slip,
            Duration::from_millis(config.runner.scene_timeout_ms),
        );
        Vehicle::bridged(config.vehicle.clone(), Box::new(renderer))?
    } else {
        Vehicle::new(config.vehicle.clone())?
    };
    Ok(vehicle)
}

/// Runs the mission on its own thread. The thread owns the telemetry sender, so
/// subscribers see the topic close when the mission ends.
fn spawn_mission(
    vehicle: Vehicle,
    config: &AppConfig,
    telemetry: Topic<Telemetry>,
) -> anyhow::Result<JoinHandle<MissionReport>> {
    let mission_config = config.mission.clone();
    let step = Duration::from_millis(config.runner.step_ms);

    info!("Spawning mission thread...");
    let handle = std::thread::Builder::new()
        .name("mission".into())
        .spawn(move || {
            info!("Mission thread started.");
            let mut pilot = Pilot::new(vehicle, telemetry, step);
            mission::run(&mut pilot, &mission_config)
        })?;
    Ok(handle)
}
