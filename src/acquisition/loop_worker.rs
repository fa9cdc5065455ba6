use std::time::Instant;

use tokio::{
    sync::mpsc,
    time::{Duration, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::display::DisplaySink;

use super::{commands::ControlCommand, controller::AcquisitionController};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Drives the controller: a tick every `tick_interval`, plus start/stop/quit
/// commands, until quit or cancellation. The session is always stopped (and
/// the port released) before returning.
///
/// A closed command channel is not a quit; the loop keeps polling until
/// cancelled so it can run unattended.
pub async fn acquisition_loop<D: DisplaySink>(
    mut controller: AcquisitionController<D>,
    mut commands: mpsc::UnboundedReceiver<ControlCommand>,
    tick_interval: Duration,
    cancel_token: CancellationToken,
) -> AcquisitionController<D> {
    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut commands_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                controller.tick(Instant::now());
            }
            command = commands.recv(), if commands_open => match command {
                Some(ControlCommand::Start) => {
                    // Failures are already logged and shown; the user retries.
                    let _ = controller.start();
                }
                Some(ControlCommand::Stop) => controller.stop(),
                Some(ControlCommand::Quit) => {
                    log_info!("Quit requested");
                    break;
                }
                None => {
                    log_debug!("Command channel closed; polling until cancelled");
                    commands_open = false;
                }
            },
            _ = cancel_token.cancelled() => {
                log_info!("acquisition loop shutting down");
                break;
            }
        }
    }

    controller.stop();
    controller
}
