//! Background planning thread.
//!
//! [`PlannerService`] moves a [`PathRequestScheduler`] onto a dedicated
//! thread and feeds it requests over a channel. Any number of cloned
//! [`PlannerHandle`]s may submit requests; they are served in the order the
//! worker receives them, one search at a time. Callbacks run on the worker
//! thread.

use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};
use nalgebra::Point3;
use nav_spatial::OccupancyOracle;
use nav_types::{PathFailure, PathResult, PlanningError, SearchStats};
use tracing::{debug, info, warn};

use crate::scheduler::{PathCallback, PathRequestScheduler};

enum Command {
    Plan {
        start: Point3<f64>,
        target: Point3<f64>,
        on_done: PathCallback,
    },
    Shutdown,
}

/// Cloneable submission handle for a [`PlannerService`].
#[derive(Debug, Clone)]
pub struct PlannerHandle {
    commands: Sender<Command>,
    /// Cleared before the shutdown command is sent. Sends hold the read lock.
    open: Arc<RwLock<bool>>,
}

impl PlannerHandle {
    /// Submits a request whose callback receives the waypoints and a success
    /// flag.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::ServiceUnavailable`] once the worker has
    /// stopped.
    pub fn request<F>(
        &self,
        start: Point3<f64>,
        target: Point3<f64>,
        on_done: F,
    ) -> Result<(), PlanningError>
    where
        F: FnOnce(Vec<Point3<f64>>, bool) + Send + 'static,
    {
        self.request_detailed(start, target, move |result: PathResult| {
            let (waypoints, success) = result.into_parts();
            on_done(waypoints, success);
        })
    }

    /// Submits a request whose callback receives the full [`PathResult`].
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::ServiceUnavailable`] once the worker has
    /// stopped.
    pub fn request_detailed<F>(
        &self,
        start: Point3<f64>,
        target: Point3<f64>,
        on_done: F,
    ) -> Result<(), PlanningError>
    where
        F: FnOnce(PathResult) + Send + 'static,
    {
        let stopped = || PlanningError::ServiceUnavailable("planner worker has stopped".into());
        let open = self.open.read().unwrap_or_else(PoisonError::into_inner);
        if !*open {
            return Err(stopped());
        }
        self.commands
            .send(Command::Plan {
                start,
                target,
                on_done: Box::new(on_done),
            })
            .map_err(|_| stopped())
    }

    fn close(&self) {
        *self.open.write().unwrap_or_else(PoisonError::into_inner) = false;
    }

    /// Submits a request and returns a receiver for its result.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::ServiceUnavailable`] once the worker has
    /// stopped.
    pub fn plan(
        &self,
        start: Point3<f64>,
        target: Point3<f64>,
    ) -> Result<Receiver<PathResult>, PlanningError> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.request_detailed(start, target, move |result| {
            // The caller may have dropped the receiver
            let _ = tx.send(result);
        })?;
        Ok(rx)
    }
}

/// A [`PathRequestScheduler`] running on its own thread.
///
/// Dropping the service shuts it down as [`shutdown`](Self::shutdown) does.
///
/// # Example
///
/// ```
/// use nav_pathfind::{PathRequestScheduler, PlannerService};
/// use nav_spatial::ObstacleField;
/// use nav_types::{GridConfig, PlannerConfig, SearchConfig};
/// use nalgebra::{Point3, Vector3};
///
/// let grid = GridConfig::new(Point3::new(8.0, 8.0, 2.0), Vector3::new(16.0, 16.0, 4.0));
/// let scheduler =
///     PathRequestScheduler::new(PlannerConfig::new(grid, SearchConfig::default()), ObstacleField::new())
///         .unwrap();
/// let service = PlannerService::spawn(scheduler).unwrap();
///
/// let result = service
///     .handle()
///     .plan(Point3::new(2.5, 8.5, 2.5), Point3::new(12.5, 8.5, 2.5))
///     .unwrap()
///     .recv()
///     .unwrap();
/// assert!(result.is_success());
///
/// service.shutdown().unwrap();
/// ```
#[derive(Debug)]
pub struct PlannerService {
    handle: PlannerHandle,
    worker: Option<JoinHandle<()>>,
}

impl PlannerService {
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::ServiceUnavailable`] if the thread cannot be
    /// spawned.
    pub fn spawn<O>(scheduler: PathRequestScheduler<O>) -> Result<Self, PlanningError>
    where
        O: OccupancyOracle + Send + 'static,
    {
        let (commands, inbox) = crossbeam_channel::unbounded();
        let worker = thread::Builder::new()
            .name("nav-planner".into())
            .spawn(move || run_worker(scheduler, &inbox))
            .map_err(|e| {
                PlanningError::ServiceUnavailable(format!("failed to spawn planner thread: {e}"))
            })?;

        info!("Planner service started");
        Ok(Self {
            handle: PlannerHandle {
                commands,
                open: Arc::new(RwLock::new(true)),
            },
            worker: Some(worker),
        })
    }

    /// Returns a new submission handle.
    #[must_use]
    pub fn handle(&self) -> PlannerHandle {
        self.handle.clone()
    }

    /// Serves every request received so far, then stops the worker.
    ///
    /// # Errors
    ///
    /// Returns [`PlanningError::ServiceUnavailable`] if the worker panicked,
    /// which happens when a completion callback panics.
    pub fn shutdown(mut self) -> Result<(), PlanningError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<(), PlanningError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        self.handle.close();
        // A worker that already died has dropped its inbox
        let _ = self.handle.commands.send(Command::Shutdown);
        worker
            .join()
            .map_err(|_| PlanningError::ServiceUnavailable("planner worker panicked".into()))?;
        info!("Planner service stopped");
        Ok(())
    }
}

impl Drop for PlannerService {
    fn drop(&mut self) {
        if let Err(error) = self.stop() {
            warn!(%error, "Planner service did not stop cleanly");
        }
    }
}

fn run_worker<O: OccupancyOracle>(mut scheduler: PathRequestScheduler<O>, inbox: &Receiver<Command>) {
    let mut shutting_down = false;

    loop {
        if !shutting_down {
            // Stop at the shutdown command so the drain cannot outrun the inbox
            for command in inbox.try_iter() {
                if accept(&mut scheduler, command) {
                    shutting_down = true;
                    break;
                }
            }
        }

        if scheduler.is_busy() {
            if let Err(error) = scheduler.tick() {
                debug!(%error, "Planner worker continuing after oracle fault");
            }
            continue;
        }

        if shutting_down {
            break;
        }

        match inbox.recv() {
            Ok(command) => shutting_down = accept(&mut scheduler, command),
            Err(_) => break,
        }
    }

    let aborted = abort_leftovers(inbox);
    if aborted > 0 {
        warn!(aborted, "Planner worker aborted requests received after shutdown");
    }
    debug!("Planner worker exiting");
}

/// Returns `true` for a shutdown command.
fn accept<O: OccupancyOracle>(scheduler: &mut PathRequestScheduler<O>, command: Command) -> bool {
    match command {
        Command::Plan {
            start,
            target,
            on_done,
        } => {
            scheduler.submit(start, target, on_done);
            false
        }
        Command::Shutdown => true,
    }
}

/// Answers every request still in the inbox with an aborted result.
fn abort_leftovers(inbox: &Receiver<Command>) -> usize {
    let mut aborted = 0;
    for command in inbox.try_iter() {
        if let Command::Plan { on_done, .. } = command {
            on_done(PathResult::failed(PathFailure::Aborted, SearchStats::default()));
            aborted += 1;
        }
    }
    aborted
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use nav_spatial::ObstacleField;
    use nav_types::{GridConfig, PlannerConfig, SearchConfig};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn service() -> PlannerService {
        let grid = GridConfig::new(Point3::new(8.0, 8.0, 2.0), Vector3::new(16.0, 16.0, 4.0));
        let config = PlannerConfig::new(grid, SearchConfig::default()).with_steps_per_update(8);
        let scheduler = PathRequestScheduler::new(config, ObstacleField::new()).unwrap();
        PlannerService::spawn(scheduler).unwrap()
    }

    fn center(x: i32, y: i32, z: i32) -> Point3<f64> {
        Point3::new(f64::from(x) + 0.5, f64::from(y) + 0.5, f64::from(z) + 0.5)
    }

    #[test]
    fn test_plan_returns_result() {
        let service = service();
        let result = service
            .handle()
            .plan(center(1, 1, 1), center(13, 9, 2))
            .unwrap()
            .recv()
            .unwrap();
        assert!(result.is_success());
        assert_eq!(result.waypoints(), &[center(13, 9, 2)]);
        service.shutdown().unwrap();
    }

    #[test]
    fn test_shutdown_drains_queue() {
        let service = service();
        let handle = service.handle();
        let (tx, rx) = crossbeam_channel::unbounded();

        for tag in 0..6 {
            let tx = tx.clone();
            handle
                .request(center(1, 1, 1), center(14, 14 - tag, 3), move |_, success| {
                    tx.send((tag, success)).unwrap();
                })
                .unwrap();
        }
        drop(tx);
        service.shutdown().unwrap();

        let delivered: Vec<(i32, bool)> = rx.iter().collect();
        assert_eq!(delivered, (0..6).map(|tag| (tag, true)).collect::<Vec<_>>());
    }

    #[test]
    fn test_handles_fail_after_shutdown() {
        let service = service();
        let handle = service.handle();
        service.shutdown().unwrap();

        let error = handle.plan(center(1, 1, 1), center(2, 2, 2)).unwrap_err();
        assert!(matches!(error, PlanningError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_handles_are_shared_across_threads() {
        let service = service();
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let handle = service.handle();
                thread::spawn(move || {
                    handle
                        .plan(center(i, 1, 1), center(15, 15, 3))
                        .unwrap()
                        .recv()
                        .unwrap()
                })
            })
            .collect();

        for worker in workers {
            assert!(worker.join().unwrap().is_success());
        }

        // Out-of-region targets clamp onto the nearest open corner cell
        let clamped = service
            .handle()
            .plan(center(1, 1, 1), Point3::new(100.0, 100.0, 100.0))
            .unwrap()
            .recv()
            .unwrap();
        assert_eq!(clamped.waypoints().last(), Some(&center(15, 15, 3)));
    }

    #[test]
    fn test_requests_racing_shutdown_are_all_answered() {
        for _ in 0..50 {
            let service = service();
            let handle = service.handle();
            let answered = Arc::new(AtomicUsize::new(0));
            let stop = Arc::new(AtomicBool::new(false));

            let producer = {
                let answered = Arc::clone(&answered);
                let stop = Arc::clone(&stop);
                thread::spawn(move || {
                    let mut accepted = 0;
                    while !stop.load(Ordering::Relaxed) {
                        let answered = Arc::clone(&answered);
                        let sent = handle.request(center(1, 1, 1), center(2, 2, 1), move |_, _| {
                            answered.fetch_add(1, Ordering::SeqCst);
                        });
                        if sent.is_err() {
                            break;
                        }
                        accepted += 1;
                        thread::yield_now();
                    }
                    accepted
                })
            };

            thread::yield_now();
            service.shutdown().unwrap();
            stop.store(true, Ordering::Relaxed);

            let accepted = producer.join().unwrap();
            assert_eq!(answered.load(Ordering::SeqCst), accepted);
        }
    }

    #[test]
    fn test_leftover_commands_are_aborted() {
        let (commands, inbox) = crossbeam_channel::unbounded();
        let (tx, rx) = crossbeam_channel::unbounded();
        for _ in 0..3 {
            let tx = tx.clone();
            commands
                .send(Command::Plan {
                    start: center(1, 1, 1),
                    target: center(2, 2, 2),
                    on_done: Box::new(move |result: PathResult| tx.send(result).unwrap()),
                })
                .unwrap();
        }
        commands.send(Command::Shutdown).unwrap();
        drop(tx);

        assert_eq!(abort_leftovers(&inbox), 3);
        let results: Vec<PathResult> = rx.iter().collect();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.failure() == Some(PathFailure::Aborted)));
    }
}
