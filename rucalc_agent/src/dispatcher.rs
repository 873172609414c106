//! Pull tasks from the orchestrator on behalf of idle workers and push their results back.

use ::core::future::Future;
use ::std::{num::NonZeroUsize, time::Duration};

use ::rucalc_common::{
    error::{Result, RucalcError},
    task::{Task, TaskResult},
    tokio::{
        select,
        sync::mpsc,
        task::JoinSet,
        time::sleep,
    },
    tracing::{debug, info, warn},
};

use crate::{
    orchestrator_client::OrchestratorClient,
    worker::{run_worker, TaskSlot},
};

/// Pause before asking again when the orchestrator could not be reached.
pub const FETCH_BACKOFF: Duration = Duration::from_millis(500);

/// Where tasks come from and where results go.
pub trait TaskSource: Send + Sync + 'static {
    /// Return `Ok(None)` if no task is ready.
    fn fetch_task(&self) -> impl Future<Output = Result<Option<Task>>> + Send;

    fn submit_result(&self, result: &TaskResult) -> impl Future<Output = Result<()>> + Send;
}

impl TaskSource for OrchestratorClient {
    async fn fetch_task(&self) -> Result<Option<Task>> {
        self.get_task()
            .await
            .map_err(RucalcError::fail_to_connect_orchestrator)
    }

    async fn submit_result(&self, result: &TaskResult) -> Result<()> {
        self.send_result(result)
            .await
            .map_err(RucalcError::fail_to_connect_orchestrator)
    }
}

/// A pool of workers fed by a single dispatch loop.
/// A task is only fetched when some worker is idle, so at most `workers` tasks are held at a time.
pub struct Agent<S> {
    source: S,
    workers: NonZeroUsize,
}

impl<S: TaskSource> Agent<S> {
    pub fn new(source: S, workers: NonZeroUsize) -> Self {
        Self { source, workers }
    }

    /// Run until `shutdown` completes, then wait for every worker to finish.
    pub async fn run(self, shutdown: impl Future<Output = ()>) {
        let workers = self.workers.get();
        let (ready_tx, ready_rx) = mpsc::channel(workers);
        let (result_tx, result_rx) = mpsc::channel(1);

        let mut pool = JoinSet::new();
        for worker_id in 0..workers {
            pool.spawn(run_worker(worker_id, ready_tx.clone(), result_tx.clone()));
        }
        drop(result_tx);
        info!("Started {} workers", workers);

        dispatch(&self.source, ready_tx, ready_rx, result_rx, shutdown).await;

        info!("Waiting for {} workers to stop", pool.len());
        while let Some(joined) = pool.join_next().await {
            if let Err(e) = joined {
                warn!("Worker ended abnormally: {}", e);
            }
        }
    }
}

async fn dispatch<S: TaskSource>(
    source: &S,
    ready_tx: mpsc::Sender<TaskSlot>,
    mut ready_rx: mpsc::Receiver<TaskSlot>,
    mut result_rx: mpsc::Receiver<TaskResult>,
    shutdown: impl Future<Output = ()>,
) {
    ::rucalc_common::tokio::pin!(shutdown);
    loop {
        // Results are drained before new work is fetched.
        select! {
            biased;
            _ = &mut shutdown => {
                info!("Stop dispatching tasks");
                break;
            }
            Some(result) = result_rx.recv() => {
                debug!("Submit result of task {}: {}", result.id, result.value);
                if let Err(e) = source.submit_result(&result).await {
                    warn!("Failed to submit result of task {}: {}", result.id, e);
                }
            }
            Some(slot) = ready_rx.recv() => {
                match source.fetch_task().await {
                    Ok(Some(task)) => {
                        debug!("Assign task {}", task.id);
                        if let Err(task) = slot.send(task) {
                            warn!("Worker left before receiving task {}", task.id);
                        }
                    }
                    Ok(None) => reannounce(&ready_tx, slot),
                    Err(e) => {
                        debug!("Failed to fetch task: {}", e);
                        sleep(FETCH_BACKOFF).await;
                        reannounce(&ready_tx, slot);
                    }
                }
            }
            else => break,
        }
    }
}

/// Put an idle worker back in line.
/// The queue has room for every worker, so this only fails once the dispatcher is gone.
fn reannounce(ready_tx: &mpsc::Sender<TaskSlot>, slot: TaskSlot) {
    if ready_tx.try_send(slot).is_err() {
        warn!("Failed to re-queue an idle worker");
    }
}
