/// Arbitration loop and blocking playback units
///
/// The loop is the only place queued requests become live clips. It runs on
/// demand: the first enqueue while idle spawns it and it exits once every
/// queue has drained. The exit re-checks emptiness under the arbitration
/// lock, so an enqueue racing the exit is either seen by this run or spawns
/// the next one; it is never silently stranded.
use std::sync::Arc;
use std::thread;

use tracing::{debug, info, warn};

use super::backend::GuardedControl;
use super::engine::EngineShared;
use super::pool::CancelSignal;
use super::request::PlaybackRequest;
use super::track::Track;

pub(crate) fn run(shared: Arc<EngineShared>) {
    debug!("Arbitration loop started");
    loop {
        for track in Track::ALL {
            if shared.queues.has_pending(track) && !shared.busy(track) {
                if let Some(request) = shared.queues.pop_next(track) {
                    dispatch(&shared, request);
                }
            }
        }

        thread::sleep(shared.config.poll_interval());

        let mut state = shared.arbiter.lock();
        if shared.queues.all_empty() {
            state.running = false;
            break;
        }
    }
    debug!("Arbitration loop ended, queues drained");
}

fn dispatch(shared: &Arc<EngineShared>, request: PlaybackRequest) {
    if request.has_guards() {
        shared.submit_blocking(request);
    } else {
        shared.start_clip(&request.path, request.track);
    }
}

/// One guarded playback unit: starts the clip, keeps the request's controls
/// disabled while it plays, and re-enables them exactly once on the way
/// out, whether that is a natural end, cancellation or a panic.
pub(crate) fn run_blocking_unit(
    shared: Arc<EngineShared>,
    request: PlaybackRequest,
    cancel: CancelSignal,
) {
    let track = request.track;
    info!(
        "Blocking playback of {} on {}: controls locked",
        request.path, track
    );
    shared.start_clip(&request.path, track);

    let reenable = ReenableGuard::new(request.guards());

    let mut cancelled = false;
    while shared.busy(track) {
        set_disabled(request.guards(), true);
        if cancel.wait(shared.config.guard_refresh()) {
            cancelled = true;
            break;
        }
    }

    if cancelled {
        // The pool shut down under us: turn that into a real stop before
        // the guard hands the controls back
        warn!(
            "Blocking playback of {} on {} cancelled; stopping track",
            request.path, track
        );
        shared.halt_track(track);
    }

    drop(reenable);
    info!(
        "Blocking playback of {} on {} finished: controls released",
        request.path, track
    );
}

/// Re-enables a set of guarded controls exactly once, on drop
struct ReenableGuard<'a> {
    guards: &'a [Arc<dyn GuardedControl>],
}

impl<'a> ReenableGuard<'a> {
    fn new(guards: &'a [Arc<dyn GuardedControl>]) -> Self {
        Self { guards }
    }
}

impl Drop for ReenableGuard<'_> {
    fn drop(&mut self) {
        set_disabled(self.guards, false);
    }
}

fn set_disabled(guards: &[Arc<dyn GuardedControl>], disabled: bool) {
    for guard in guards {
        guard.set_disabled(disabled);
    }
}
