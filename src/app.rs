use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use std::sync::Arc;

use crate::admission::{RouteClass, rate_limit_middleware};
use crate::handlers::{
    create_employee, delete_employee, get_employee, metrics_handler, root_handler,
    search_employees, update_employee,
};
use crate::state::AppState;

/// Build the HTTP surface. Every route except `/metrics` passes the
/// admission check of its route class before reaching the handler.
pub fn router(state: Arc<AppState>) -> Router {
    let limit = |class| {
        middleware::from_fn_with_state(state.admission.guard(class), rate_limit_middleware)
    };
    let health = limit(RouteClass::Health);
    let read = limit(RouteClass::Read);
    let write = limit(RouteClass::Write);

    let collection = get(search_employees)
        .route_layer(read.clone())
        .merge(post(create_employee).route_layer(write.clone()));

    let item = get(get_employee)
        .route_layer(read)
        .merge(put(update_employee).delete(delete_employee).route_layer(write));

    Router::new()
        .route("/", get(root_handler).route_layer(health))
        .route("/employees", collection.clone())
        .route("/employees/", collection)
        .route("/employees/{employee_id}", item)
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}
