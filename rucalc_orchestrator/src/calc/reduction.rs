//! Decomposition of expressions into ready tasks and reassembly of task results.

use ::std::collections::{HashMap, VecDeque};

use ::rucalc_common::{
    anyhow::anyhow,
    error::{Result, RucalcError},
    expression::{Expression, ExpressionId, ExpressionStatus},
    task::{Operator, Task, TaskId},
    tracing::debug,
};

use super::{
    tokens::{Handle, Token, TokenList},
    OperationTimes,
};

/// An expression together with its current reduction state.
#[derive(Debug)]
pub(crate) struct ExpressionRecord {
    pub(crate) id: ExpressionId,
    pub(crate) source: String,
    pub(crate) status: ExpressionStatus,
    pub(crate) result: String,
    pub(crate) tokens: TokenList,
}

impl ExpressionRecord {
    pub(crate) fn new(id: ExpressionId, source: String, status: ExpressionStatus) -> Self {
        Self {
            id,
            source,
            status,
            result: String::new(),
            tokens: TokenList::default(),
        }
    }

    pub(crate) fn view(&self) -> Expression {
        Expression {
            id: self.id.clone(),
            status: self.status,
            result: self.result.clone(),
            source: self.source.clone(),
        }
    }
}

/// Where the value of an in-flight task has to go.
#[derive(Debug)]
pub(crate) struct PendingTask {
    pub(crate) expression: ExpressionId,
    pub(crate) placeholder: Handle,
    pub(crate) task: Task,
}

/// Task id allocation, the ready queue and the pending table.
#[derive(Debug, Default)]
pub(crate) struct TaskBook {
    next_id: TaskId,
    ready: VecDeque<TaskId>,
    pending: HashMap<TaskId, PendingTask>,
}

impl TaskBook {
    fn allocate_id(&mut self) -> TaskId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn enqueue(&mut self, pending: PendingTask) {
        let id = pending.task.id;
        self.pending.insert(id, pending);
        self.ready.push_back(id);
    }

    /// Pop the oldest ready task.
    /// Entries whose task got resolved while waiting in the queue are dropped.
    pub(crate) fn pop_ready(&mut self) -> Option<&Task> {
        while let Some(id) = self.ready.pop_front() {
            if self.pending.contains_key(&id) {
                return self.pending.get(&id).map(|pending| &pending.task);
            }
            debug!("Skip task {} as it has been resolved", id);
        }
        None
    }

    /// Put a dispatched task back at the tail of the ready queue.
    /// Returns false if the task is no longer pending.
    pub(crate) fn requeue(&mut self, id: TaskId) -> bool {
        if self.pending.contains_key(&id) {
            self.ready.push_back(id);
            true
        } else {
            false
        }
    }

    pub(crate) fn take_pending(&mut self, id: TaskId) -> Option<PendingTask> {
        self.pending.remove(&id)
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// Replace every `[Number, Number, Operator]` triple of the expression with a task placeholder
/// and queue the corresponding tasks. Returns how many tasks were emitted.
pub(crate) fn decompose(
    record: &mut ExpressionRecord,
    book: &mut TaskBook,
    times: &OperationTimes,
) -> usize {
    let tokens = &mut record.tokens;
    let mut emitted = 0;
    let mut cursor = tokens.first();

    while let Some(first) = cursor {
        let triple = next_triple(tokens, first);
        let Some((second, third, lhs, rhs, operation)) = triple else {
            cursor = tokens.next(first);
            continue;
        };

        let id = book.allocate_id();
        let Some(placeholder) = tokens.insert_before(Token::Task(id), first) else {
            break;
        };
        tokens.remove(first);
        tokens.remove(second);
        tokens.remove(third);

        let task = Task {
            id,
            arg1: lhs.to_string(),
            arg2: rhs.to_string(),
            operation,
            operation_time: times.of(operation),
        };
        debug!("Expression {} emits task {:?}", record.id, task);
        book.enqueue(PendingTask {
            expression: record.id.clone(),
            placeholder,
            task,
        });
        emitted += 1;
        cursor = tokens.next(placeholder);
    }
    emitted
}

/// Handles of the 2nd and 3rd tokens plus their values, if `first` starts a reducible triple.
fn next_triple(
    tokens: &TokenList,
    first: Handle,
) -> Option<(Handle, Handle, f64, f64, Operator)> {
    let second = tokens.next(first)?;
    let third = tokens.next(second)?;
    match (tokens.get(first)?, tokens.get(second)?, tokens.get(third)?) {
        (Token::Number(lhs), Token::Number(rhs), Token::Operator(operation)) => {
            Some((second, third, lhs, rhs, operation))
        }
        _ => None,
    }
}

/// Substitute the value of a resolved task for its placeholder.
/// The expression is done when the placeholder was its only token,
/// otherwise newly reducible triples are decomposed.
pub(crate) fn reassemble(
    record: &mut ExpressionRecord,
    placeholder: Handle,
    value: f64,
    book: &mut TaskBook,
    times: &OperationTimes,
) -> Result<()> {
    let vanished = || {
        RucalcError::not_found(anyhow!(
            "Placeholder of expression {} not found",
            record.id
        ))
    };
    if record.tokens.len() == 1 {
        record.tokens.remove(placeholder).ok_or_else(vanished)?;
        record.result = value.to_string();
        record.status = ExpressionStatus::Done;
    } else {
        record
            .tokens
            .replace(placeholder, Token::Number(value))
            .ok_or_else(vanished)?;
        decompose(record, book, times);
    }
    Ok(())
}
