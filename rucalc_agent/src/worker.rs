use ::rucalc_common::{
    task::{Task, TaskResult},
    tokio::{
        sync::{mpsc, oneshot},
        time::sleep,
    },
    tracing::debug,
};

/// A free worker hands one of these to the dispatcher and waits on the other end for a task.
pub(crate) type TaskSlot = oneshot::Sender<Task>;

/// Compute a task after waiting for its simulated operation time.
/// Operands that are not numbers yield `NaN`.
pub async fn execute(task: Task) -> TaskResult {
    sleep(task.operation_time).await;
    let value = match (task.arg1.trim().parse::<f64>(), task.arg2.trim().parse::<f64>()) {
        (Ok(lhs), Ok(rhs)) => task.operation.apply(lhs, rhs),
        _ => f64::NAN,
    };
    TaskResult {
        id: task.id,
        value: value.to_string(),
    }
}

/// Announce readiness, compute the assigned task, report the result and repeat.
/// Stop once the dispatcher hangs up on either channel.
pub(crate) async fn run_worker(
    worker_id: usize,
    ready: mpsc::Sender<TaskSlot>,
    results: mpsc::Sender<TaskResult>,
) {
    loop {
        let (slot, assigned) = oneshot::channel();
        if ready.send(slot).await.is_err() {
            break;
        }
        let Ok(task) = assigned.await else {
            break;
        };
        debug!(
            "Worker {} computes task {}: {} {} {}",
            worker_id, task.id, task.arg1, task.operation, task.arg2
        );
        let result = execute(task).await;
        if results.send(result).await.is_err() {
            break;
        }
    }
    debug!("Worker {} stops", worker_id);
}
