use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::blackboard::{Blackboard, clear_fault, raise_fault, snapshot, touch_cmd};
use crate::bus::Telemetry;

const STALL_FAULT: &str = "mission stalled";

/// Logs telemetry and watches for stalls until the telemetry topic closes.
///
/// The mission thread owns the last sender, so the topic closes when the mission ends.
pub async fn run(
    bb: Blackboard,
    mut telemetry_rx: broadcast::Receiver<Arc<Telemetry>>,
    stall_timeout: Duration,
    tick: Duration,
) -> anyhow::Result<()> {
    info!("Monitor task started.");
    let mut ticker = tokio::time::interval(tick);
    let mut frames = 0usize;

    loop {
        tokio::select! {
            frame = telemetry_rx.recv() => match frame {
                Ok(frame) => {
                    frames += 1;
                    touch_cmd(&bb);
                    clear_fault(&bb, STALL_FAULT);
                    let status = &frame.status;
                    info!(
                        command = frame.command.as_deref().unwrap_or("-"),
                        x = status.position.0,
                        y = status.position.1,
                        heading = status.heading,
                        battery = status.battery,
                        nearby = status.obstacles_nearby,
                        "Telemetry"
                    );
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Monitor lagged behind telemetry");
                }
                Err(RecvError::Closed) => {
                    info!(frames, "Telemetry closed, monitor exiting.");
                    return Ok(());
                }
            },
            _ = ticker.tick() => watchdog(&bb, stall_timeout),
        }
    }
}

/// Raises a stall fault once when no command has been seen within `stall_timeout`.
fn watchdog(bb: &Blackboard, stall_timeout: Duration) {
    let last_cmd_ts = snapshot(bb).last_cmd_ts;
    let age = Instant::now() - last_cmd_ts;
    if age > stall_timeout {
        if raise_fault(bb, STALL_FAULT) {
            warn!(?age, ?stall_timeout, "No command issued within the stall timeout");
        }
    } else {
        debug!(?age, "Watchdog ok");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Topic;
    use obocar_vehicle::{Vehicle, VehicleConfig};

    #[test]
    fn test_watchdog_raises_once() {
        let bb: Blackboard = Arc::default();
        bb.write().last_cmd_ts = Instant::now() - Duration::from_secs(5);
        watchdog(&bb, Duration::from_millis(100));
        watchdog(&bb, Duration::from_millis(100));
        assert_eq!(snapshot(&bb).faults, vec![STALL_FAULT.to_string()]);
    }

    #[test]
    fn test_watchdog_quiet_when_fresh() {
        let bb: Blackboard = Arc::default();
        watchdog(&bb, Duration::from_secs(60));
        assert!(snapshot(&bb).faults.is_empty());
    }

    #[tokio::test]
    async fn test_monitor_exits_when_topic_closes() {
        let bb: Blackboard = Arc::default();
        let topic: Topic<Telemetry> = Topic::new(8);
        let rx = topic.subscribe();

        let vehicle = Vehicle::new(VehicleConfig::quiet()).unwrap();
        topic.publish(Telemetry::capture(&vehicle));
        drop(topic);

        run(bb.clone(), rx, Duration::from_secs(60), Duration::from_millis(10))
            .await
            .unwrap();
        assert!(snapshot(&bb).faults.is_empty());
    }
}
