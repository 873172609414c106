//! Dispatch deadlines of in-flight tasks, ordered by expiry.

use ::std::collections::{BTreeSet, HashMap};

use ::rucalc_common::{task::TaskId, tokio::time::Instant};

#[derive(Debug, Default)]
pub(crate) struct Deadlines {
    queue: BTreeSet<(Instant, TaskId)>,
    armed: HashMap<TaskId, Instant>,
}

impl Deadlines {
    /// Arm (or re-arm) the deadline of a dispatched task.
    pub(crate) fn arm(&mut self, id: TaskId, deadline: Instant) {
        if let Some(previous) = self.armed.insert(id, deadline) {
            self.queue.remove(&(previous, id));
        }
        self.queue.insert((deadline, id));
    }

    /// Return whether a deadline was armed for the task.
    pub(crate) fn cancel(&mut self, id: TaskId) -> bool {
        match self.armed.remove(&id) {
            Some(deadline) => {
                self.queue.remove(&(deadline, id));
                true
            }
            None => false,
        }
    }

    /// Disarm and return every task whose deadline is not after `now`, earliest first.
    pub(crate) fn expire(&mut self, now: Instant) -> Vec<TaskId> {
        let mut expired = vec![];
        while let Some(&(deadline, id)) = self.queue.first() {
            if deadline > now {
                break;
            }
            self.queue.pop_first();
            self.armed.remove(&id);
            expired.push(id);
        }
        expired
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.queue.first().map(|&(deadline, _)| deadline)
    }
}
