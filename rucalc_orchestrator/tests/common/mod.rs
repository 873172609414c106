use ::std::sync::Arc;

use ::axum_test::TestServer;
use ::rucalc_common::error::*;
use ::rucalc_orchestrator::{get_server, OperationTimes, Scheduler, DEFAULT_GRACE_PERIOD};

pub fn operation_times() -> OperationTimes {
    OperationTimes {
        addition_millis: 10,
        subtraction_millis: 20,
        multiplication_millis: 30,
        division_millis: 40,
    }
}

pub async fn get_test_server() -> Result<TestServer> {
    let scheduler = Arc::new(Scheduler::new(operation_times(), DEFAULT_GRACE_PERIOD));
    let app = get_server(scheduler)?;
    TestServer::new(app).map_err(RucalcError::fail_to_start_server)
}
