use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("tutorchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("tutorchat.client.request_errors");
pub(crate) static CLIENT_TRANSPORT_ERRORS: Counter =
    Counter::new("tutorchat.client.transport_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("tutorchat.client.request_duration_seconds");

pub(crate) static SESSION_SUBMITS: Counter = Counter::new("tutorchat.session.submits");
pub(crate) static SESSION_IGNORED: Counter = Counter::new("tutorchat.session.ignored");
pub(crate) static SESSION_ANSWERED: Counter = Counter::new("tutorchat.session.answered");
pub(crate) static SESSION_BACKEND_ERRORS: Counter =
    Counter::new("tutorchat.session.backend_errors");
pub(crate) static SESSION_TRANSPORT_ERRORS: Counter =
    Counter::new("tutorchat.session.transport_errors");
pub(crate) static SESSION_CANCELLED: Counter = Counter::new("tutorchat.session.cancelled");
pub(crate) static SESSION_WORKFLOW_STEPS: Counter =
    Counter::new("tutorchat.session.workflow_steps");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_TRANSPORT_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_SUBMITS);
    collector.register_counter(&SESSION_IGNORED);
    collector.register_counter(&SESSION_ANSWERED);
    collector.register_counter(&SESSION_BACKEND_ERRORS);
    collector.register_counter(&SESSION_TRANSPORT_ERRORS);
    collector.register_counter(&SESSION_CANCELLED);
    collector.register_counter(&SESSION_WORKFLOW_STEPS);
}
