use macroquad::prelude::*;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::bus::Telemetry;

// Function to configure the macroquad window
pub fn window_conf() -> Conf {
    Conf {
        window_title: "Obocar".to_string(),
        window_width: 800,
        window_height: 800,
        high_dpi: true,
        ..Default::default()
    }
}

const VIS_SCALE: f32 = 12.0; // pixels per unit
const TRAIL_LIMIT: usize = 2_000;

/// Plane coordinates to screen pixels; +Y points up the screen.
fn to_screen(x: f64, y: f64) -> Vec2 {
    Vec2::new(
        screen_width() / 2.0 + x as f32 * VIS_SCALE,
        screen_height() / 2.0 - y as f32 * VIS_SCALE,
    )
}

/// Direction of a compass heading (degrees clockwise from +Y) in screen space.
fn screen_dir(heading_deg: f64) -> Vec2 {
    let h = heading_deg.to_radians() as f32;
    Vec2::new(h.sin(), -h.cos())
}

pub async fn run_visualization_loop(mut telemetry_rx: broadcast::Receiver<Arc<Telemetry>>) {
    let mut latest: Option<Arc<Telemetry>> = None;
    let mut trail: Vec<Vec2> = Vec::new();
    let mut finished = false;

    info!("Visualization loop starting.");

    loop {
        loop {
            match telemetry_rx.try_recv() {
                Ok(frame) => {
                    if trail.len() < TRAIL_LIMIT {
                        trail.push(Vec2::new(frame.pose.x as f32, frame.pose.y as f32));
                    }
                    latest = Some(frame);
                }
                Err(broadcast::error::TryRecvError::Empty) => break,
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Visualization telemetry receiver lagged.");
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    if !finished {
                        info!("Mission finished; close the window to exit.");
                        finished = true;
                    }
                    break;
                }
            }
        }

        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        clear_background(LIGHTGRAY);

        // Axes
        let origin = to_screen(0.0, 0.0);
        draw_line(0.0, origin.y, screen_width(), origin.y, 1.0, GRAY);
        draw_line(origin.x, 0.0, origin.x, screen_height(), 1.0, GRAY);

        for pair in trail.windows(2) {
            let a = to_screen(pair[0].x as f64, pair[0].y as f64);
            let b = to_screen(pair[1].x as f64, pair[1].y as f64);
            draw_line(a.x, a.y, b.x, b.y, 2.0, DARKGREEN);
        }

        if let Some(frame) = latest.as_ref() {
            for p in &frame.obstacles {
                let s = to_screen(p.x, p.y);
                draw_circle(s.x, s.y, 6.0, RED);
            }

            let pose = frame.pose;
            let center = to_screen(pose.x, pose.y);

            // Front sensor cone
            let reach = frame.sensor_range as f32 * VIS_SCALE;
            let left_edge = center + screen_dir(pose.heading - frame.cone_half_width) * reach;
            let right_edge = center + screen_dir(pose.heading + frame.cone_half_width) * reach;
            draw_triangle(center, left_edge, right_edge, Color::new(1.0, 0.9, 0.2, 0.25));

            let r_size = 12.0;
            let nose = center + screen_dir(pose.heading) * r_size;
            let port = center + screen_dir(pose.heading - 140.0) * r_size;
            let starboard = center + screen_dir(pose.heading + 140.0) * r_size;
            draw_triangle(nose, port, starboard, BLUE);
            draw_line(center.x, center.y, nose.x, nose.y, 2.0, DARKBLUE);

            let status = &frame.status;
            draw_text(
                &format!(
                    "x={:.1} y={:.1} heading={:.1} battery={:.1}% distance={:.1}",
                    status.position.0, status.position.1, status.heading, status.battery, status.distance
                ),
                10.0,
                20.0,
                20.0,
                BLACK,
            );
            draw_text(
                &format!(
                    "last: {}  nearby: {}",
                    frame.command.as_deref().unwrap_or("-"),
                    status.obstacles_nearby
                ),
                10.0,
                40.0,
                20.0,
                BLACK,
            );
        } else if finished {
            error!("Telemetry closed before any frame arrived.");
            break;
        }

        next_frame().await
    }
}
