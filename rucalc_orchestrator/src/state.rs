//! Shared state between handlers.

use ::std::sync::Arc;

use crate::calc::scheduler::Scheduler;

#[derive(Clone)]
pub(crate) struct AppState {
    scheduler: Arc<Scheduler>,
}

impl AppState {
    pub(crate) fn new(scheduler: Arc<Scheduler>) -> Self {
        Self { scheduler }
    }

    pub(crate) fn get_scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}
