//! The main dispatch loop.
//!
//! Backends push translated events into an unbounded queue; this loop is
//! the only consumer and the only code that touches [`Shell`] state.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::display::{DisplayServer, Event};
use crate::launcher::Launcher;
use crate::shell::{Flow, Shell};

/// How often the clock is refreshed when no events arrive.
pub const CLOCK_TICK: Duration = Duration::from_secs(1);

/// Why the dispatch loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Logout,
    Interrupted,
    /// The event queue closed, normally because the display went away.
    Disconnected,
}

/// Dispatch events until logout, ctrl-c or disconnect, then tear the shell down.
pub async fn run<D, L>(shell: &mut Shell<D, L>, mut events: UnboundedReceiver<Event>) -> StopReason
where
    D: DisplayServer,
    L: Launcher,
{
    let mut clock = tokio::time::interval(CLOCK_TICK);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    let mut listen_for_interrupt = true;

    let reason = loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if shell.handle_event(event) == Flow::Exit {
                        break StopReason::Logout;
                    }
                    shell.tick();
                }
                None => break StopReason::Disconnected,
            },
            _ = clock.tick() => shell.tick(),
            result = &mut interrupt, if listen_for_interrupt => match result {
                Ok(()) => break StopReason::Interrupted,
                Err(e) => {
                    warn!("Failed to listen for ctrl-c: {e}");
                    listen_for_interrupt = false;
                }
            },
        }
    };

    info!("Dispatch loop stopped: {reason:?}");
    shell.shutdown();
    reason
}
