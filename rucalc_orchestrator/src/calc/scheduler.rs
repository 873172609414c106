//! Shared state of the orchestrator: expressions, ready queue, pending tasks and deadlines,
//! all behind one reader/writer lock.

use ::std::{collections::BTreeMap, sync::Arc, time::Duration};

use ::rucalc_common::{
    anyhow::anyhow,
    error::{Result, RucalcError},
    expression::{Expression, ExpressionId, ExpressionStatus},
    task::{Task, TaskId},
    tokio::{
        select,
        sync::{Notify, RwLock},
        time::{sleep_until, Instant},
    },
    tracing::{debug, info, warn},
};

use super::{
    compiler::{compile, Compiled},
    deadlines::Deadlines,
    reduction::{decompose, reassemble, ExpressionRecord, TaskBook},
    OperationTimes,
};

/// Extra time granted to a dispatched task on top of its operation time
/// before it is considered lost.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct SchedulerState {
    expressions: BTreeMap<ExpressionId, ExpressionRecord>,
    book: TaskBook,
    deadlines: Deadlines,
}

impl SchedulerState {
    fn add_expression(&mut self, id: String, source: String, times: &OperationTimes) -> Result<()> {
        let id = ExpressionId::try_from(id)?;
        if source.is_empty() {
            return Err(RucalcError::invalid_argument(anyhow!(
                "Expression cannot be empty."
            )));
        }
        if self.expressions.contains_key(&id) {
            return Err(RucalcError::invalid_argument(anyhow!(
                "Expression id {} is not unique.",
                id
            )));
        }

        match compile(&source) {
            Ok(Compiled::Resolved(literal)) => {
                let mut record = ExpressionRecord::new(id.clone(), source, ExpressionStatus::Done);
                record.result = literal;
                self.expressions.insert(id, record);
                Ok(())
            }
            Ok(Compiled::Postfix(tokens)) => {
                let mut record =
                    ExpressionRecord::new(id.clone(), source, ExpressionStatus::InProcess);
                record.tokens = tokens.into_iter().collect();
                let record = self.expressions.entry(id).or_insert(record);
                let emitted = decompose(record, &mut self.book, times);
                debug!("Expression {} is split into {} ready tasks", record.id, emitted);
                Ok(())
            }
            Err(e) => {
                // keep the rejected expression visible for lookups
                self.expressions.insert(
                    id.clone(),
                    ExpressionRecord::new(id, source, ExpressionStatus::Error),
                );
                Err(e)
            }
        }
    }

    fn dispatch(&mut self, now: Instant, grace_period: Duration) -> Option<Task> {
        let task = self.book.pop_ready()?.clone();
        self.deadlines
            .arm(task.id, now + task.operation_time + grace_period);
        Some(task)
    }

    fn resolve(&mut self, id: TaskId, value: f64, times: &OperationTimes) -> Result<()> {
        self.deadlines.cancel(id);
        let pending = self
            .book
            .take_pending(id)
            .ok_or_else(|| RucalcError::not_found(anyhow!("Task {} not found", id)))?;
        let record = self.expressions.get_mut(&pending.expression).ok_or_else(|| {
            RucalcError::not_found(anyhow!("Expression of task {} not found", id))
        })?;
        reassemble(record, pending.placeholder, value, &mut self.book, times)
    }

    /// Put every task whose deadline passed back into the ready queue.
    fn requeue_expired(&mut self, now: Instant) -> Vec<TaskId> {
        self.deadlines
            .expire(now)
            .into_iter()
            .filter(|id| self.book.requeue(*id))
            .collect()
    }
}

/// Scheduler owning every expression submitted to the orchestrator.
#[derive(Debug)]
pub struct Scheduler {
    state: RwLock<SchedulerState>,
    operation_times: OperationTimes,
    grace_period: Duration,
    /// Wakes the deadline monitor when a new deadline is armed.
    armed: Notify,
}

impl Scheduler {
    pub fn new(operation_times: OperationTimes, grace_period: Duration) -> Self {
        Self {
            state: RwLock::new(SchedulerState::default()),
            operation_times,
            grace_period,
            armed: Notify::new(),
        }
    }

    /// Compile and store an expression, queueing its first ready tasks.
    /// # Return
    /// - `Ok(())` if the expression is accepted.
    /// - `Err(_)` if the id is empty or taken, the expression is empty, or it fails to compile.
    ///   A compile failure still stores the expression with status `Error`.
    pub async fn add_expression(&self, id: String, source: String) -> Result<()> {
        let label = id.clone();
        let mut state = self.state.write().await;
        state
            .add_expression(id, source, &self.operation_times)
            .inspect(|_| info!("Accept expression {:?}", label))
            .inspect_err(|e| warn!("Reject expression {:?}: {}", label, e))
    }

    /// Return all expressions sorted by id
    pub async fn list_all(&self) -> Vec<Expression> {
        let state = self.state.read().await;
        state
            .expressions
            .values()
            .map(ExpressionRecord::view)
            .collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Expression> {
        let state = self.state.read().await;
        state
            .expressions
            .get(id)
            .map(ExpressionRecord::view)
            .ok_or_else(|| RucalcError::not_found(anyhow!("Expression {} not found", id)))
    }

    /// Pop the oldest ready task and arm its deadline.
    /// Return `None` if nothing is ready.
    pub async fn get_task(&self) -> Option<Task> {
        let task = {
            let mut state = self.state.write().await;
            state.dispatch(Instant::now(), self.grace_period)
        }?;
        debug!("Dispatch task {}", task.id);
        self.armed.notify_one();
        Some(task)
    }

    /// Apply the value of a task. Only the first result of a task is applied,
    /// later ones get a not found error.
    pub async fn put_result(&self, id: TaskId, value: f64) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .resolve(id, value, &self.operation_times)
            .inspect(|_| debug!("Task {} resolved with {}", id, value))
            .inspect_err(|e| warn!("Reject result of task {}: {}", id, e))
    }

    /// Requeue tasks whose deadline expired. Runs forever.
    pub async fn run_deadline_monitor(self: Arc<Self>) {
        loop {
            let next_deadline = {
                let mut state = self.state.write().await;
                let requeued = state.requeue_expired(Instant::now());
                if !requeued.is_empty() {
                    info!("Requeue timed out tasks {:?}", requeued);
                }
                state.deadlines.next_deadline()
            };
            match next_deadline {
                Some(deadline) => {
                    select! {
                        _ = sleep_until(deadline) => {}
                        _ = self.armed.notified() => {}
                    }
                }
                None => self.armed.notified().await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::rucalc_common::{error::RucalcErrorType, tokio};

    fn times() -> OperationTimes {
        OperationTimes {
            addition_millis: 100,
            subtraction_millis: 200,
            multiplication_millis: 300,
            division_millis: 400,
        }
    }

    /// Play the role of every agent until no task is left.
    fn drain(state: &mut SchedulerState) -> usize {
        let mut resolved = 0;
        while let Some(task) = state.dispatch(Instant::now(), DEFAULT_GRACE_PERIOD) {
            let lhs: f64 = task.arg1.parse().unwrap();
            let rhs: f64 = task.arg2.parse().unwrap();
            state
                .resolve(task.id, task.operation.apply(lhs, rhs), &times())
                .unwrap();
            resolved += 1;
        }
        resolved
    }

    fn result_of(state: &SchedulerState, id: &str) -> (ExpressionStatus, String) {
        let record = &state.expressions[id];
        (record.status, record.result.clone())
    }

    #[test]
    fn evaluate_with_standard_precedence() {
        let cases = [
            ("a", "2+2*2", "6"),
            ("b", "(2+2)*2", "8"),
            ("c", "-3+5", "2"),
            ("d", "1-2-3", "-4"),
            ("e", "(1+2)*(3+4)/7", "3"),
            ("f", "2.5*4", "10"),
        ];
        let mut state = SchedulerState::default();
        for (id, source, _) in cases {
            state
                .add_expression(id.to_owned(), source.to_owned(), &times())
                .unwrap();
        }
        drain(&mut state);
        for (id, _, expected) in cases {
            assert_eq!(
                result_of(&state, id),
                (ExpressionStatus::Done, expected.to_owned())
            );
        }
    }

    #[test]
    fn one_resolution_per_operator() {
        let mut state = SchedulerState::default();
        state
            .add_expression("x".to_owned(), "1+2*3-4/2+(5-1)*2".to_owned(), &times())
            .unwrap();
        assert_eq!(drain(&mut state), 7);
        assert_eq!(
            result_of(&state, "x"),
            (ExpressionStatus::Done, "13".to_owned())
        );
    }

    #[test]
    fn single_number_is_done_immediately() {
        let mut state = SchedulerState::default();
        state
            .add_expression("n".to_owned(), "(3.50)".to_owned(), &times())
            .unwrap();
        assert_eq!(
            result_of(&state, "n"),
            (ExpressionStatus::Done, "3.50".to_owned())
        );
        assert!(state.dispatch(Instant::now(), DEFAULT_GRACE_PERIOD).is_none());
    }

    #[test]
    fn reject_invalid_submissions() {
        let mut state = SchedulerState::default();
        let empty_id = state
            .add_expression(String::new(), "1+1".to_owned(), &times())
            .unwrap_err();
        assert_eq!(empty_id.get_error_type(), RucalcErrorType::InvalidArgument);
        let empty_source = state
            .add_expression("a".to_owned(), String::new(), &times())
            .unwrap_err();
        assert_eq!(empty_source.get_error_type(), RucalcErrorType::InvalidArgument);
        assert!(state.expressions.is_empty());

        state
            .add_expression("a".to_owned(), "1+1".to_owned(), &times())
            .unwrap();
        let duplicate = state
            .add_expression("a".to_owned(), "2+2".to_owned(), &times())
            .unwrap_err();
        assert_eq!(duplicate.get_error_type(), RucalcErrorType::InvalidArgument);
        assert_eq!(state.expressions["a"].source, "1+1");
    }

    #[test]
    fn malformed_expression_is_stored_as_error() {
        let mut state = SchedulerState::default();
        for (id, source) in [("1", "2++2"), ("2", "(2+2"), ("3", "2 2"), ("4", " ")] {
            let error = state
                .add_expression(id.to_owned(), source.to_owned(), &times())
                .unwrap_err();
            assert_eq!(error.get_error_type(), RucalcErrorType::InvalidExpression);
            assert_eq!(
                result_of(&state, id),
                (ExpressionStatus::Error, String::new())
            );
        }
        assert!(state.dispatch(Instant::now(), DEFAULT_GRACE_PERIOD).is_none());
    }

    #[test]
    fn duplicate_result_applies_once() {
        let mut state = SchedulerState::default();
        state
            .add_expression("a".to_owned(), "2*3+1".to_owned(), &times())
            .unwrap();
        let task = state.dispatch(Instant::now(), DEFAULT_GRACE_PERIOD).unwrap();
        state.resolve(task.id, 6.0, &times()).unwrap();
        let error = state.resolve(task.id, 100.0, &times()).unwrap_err();
        assert_eq!(error.get_error_type(), RucalcErrorType::NotFound);

        let next = state.dispatch(Instant::now(), DEFAULT_GRACE_PERIOD).unwrap();
        assert_eq!((next.arg1.as_str(), next.arg2.as_str()), ("6", "1"));
        state.resolve(next.id, 7.0, &times()).unwrap();
        assert_eq!(
            result_of(&state, "a"),
            (ExpressionStatus::Done, "7".to_owned())
        );
    }

    #[test]
    fn unknown_task_is_not_found() {
        let mut state = SchedulerState::default();
        let error = state.resolve(42, 1.0, &times()).unwrap_err();
        assert_eq!(error.to_string(), "Not found: Task 42 not found");
    }

    #[test]
    fn timed_out_task_is_redispatched_with_same_id() {
        let mut state = SchedulerState::default();
        state
            .add_expression("a".to_owned(), "8/2".to_owned(), &times())
            .unwrap();
        let now = Instant::now();
        let task = state.dispatch(now, DEFAULT_GRACE_PERIOD).unwrap();
        assert!(state.dispatch(now, DEFAULT_GRACE_PERIOD).is_none());

        // division takes 400ms, plus the grace period
        let just_before = now + Duration::from_millis(400) + DEFAULT_GRACE_PERIOD
            - Duration::from_millis(1);
        assert!(state.requeue_expired(just_before).is_empty());
        let deadline = now + Duration::from_millis(400) + DEFAULT_GRACE_PERIOD;
        assert_eq!(state.requeue_expired(deadline), vec![task.id]);

        let again = state.dispatch(deadline, DEFAULT_GRACE_PERIOD).unwrap();
        assert_eq!(again, task);

        // the late result of the first dispatch still resolves the task
        state.resolve(task.id, 4.0, &times()).unwrap();
        assert!(state.resolve(again.id, 4.0, &times()).is_err());
        assert_eq!(
            result_of(&state, "a"),
            (ExpressionStatus::Done, "4".to_owned())
        );
    }

    #[test]
    fn resolved_task_is_not_redispatched_after_timeout() {
        let mut state = SchedulerState::default();
        state
            .add_expression("a".to_owned(), "1+1".to_owned(), &times())
            .unwrap();
        let now = Instant::now();
        let task = state.dispatch(now, Duration::ZERO).unwrap();
        let later = now + Duration::from_secs(1);
        assert_eq!(state.requeue_expired(later), vec![task.id]);
        state.resolve(task.id, 2.0, &times()).unwrap();
        assert!(state.dispatch(later, Duration::ZERO).is_none());
    }

    #[test]
    fn division_by_zero_propagates() {
        let mut state = SchedulerState::default();
        state
            .add_expression("inf".to_owned(), "1/0+1".to_owned(), &times())
            .unwrap();
        state
            .add_expression("nan".to_owned(), "0/0*2".to_owned(), &times())
            .unwrap();
        drain(&mut state);
        assert_eq!(
            result_of(&state, "inf"),
            (ExpressionStatus::Done, "inf".to_owned())
        );
        assert_eq!(
            result_of(&state, "nan"),
            (ExpressionStatus::Done, "NaN".to_owned())
        );
    }

    #[tokio::test]
    async fn list_all_is_sorted_by_id() -> Result<()> {
        let scheduler = Scheduler::new(times(), DEFAULT_GRACE_PERIOD);
        for id in ["b", "c", "a", "10", "2"] {
            scheduler.add_expression(id.to_owned(), "1".to_owned()).await?;
        }
        let ids: Vec<String> = scheduler
            .list_all()
            .await
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, vec!["10", "2", "a", "b", "c"]);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_submissions_stay_sorted() -> Result<()> {
        let scheduler = Arc::new(Scheduler::new(times(), DEFAULT_GRACE_PERIOD));
        let handles: Vec<_> = (0..20)
            .rev()
            .map(|i| {
                let scheduler = scheduler.clone();
                tokio::spawn(async move {
                    scheduler
                        .add_expression(format!("{:02}", i), "1+1".to_owned())
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.map_err(RucalcError::invalid_argument)??;
        }
        let ids: Vec<String> = scheduler
            .list_all()
            .await
            .into_iter()
            .map(|e| e.id.to_string())
            .collect();
        let expected: Vec<String> = (0..20).map(|i| format!("{:02}", i)).collect();
        assert_eq!(ids, expected);
        Ok(())
    }

    #[tokio::test]
    async fn find_missing_expression() {
        let scheduler = Scheduler::new(times(), DEFAULT_GRACE_PERIOD);
        let error = scheduler.find_by_id("nope").await.unwrap_err();
        assert_eq!(error.to_string(), "Not found: Expression nope not found");
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_monitor_requeues_lost_task() -> Result<()> {
        let scheduler = Arc::new(Scheduler::new(OperationTimes::default(), Duration::from_secs(1)));
        scheduler
            .add_expression("a".to_owned(), "3-1".to_owned())
            .await?;
        tokio::spawn(scheduler.clone().run_deadline_monitor());

        let task = scheduler.get_task().await.expect("one ready task");
        assert!(scheduler.get_task().await.is_none());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(scheduler.get_task().await, Some(task.clone()));

        scheduler.put_result(task.id, 2.0).await?;
        assert_eq!(scheduler.find_by_id("a").await?.result, "2");
        Ok(())
    }
}
