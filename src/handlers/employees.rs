use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::error::ApiResult;
use crate::models::{Employee, EmployeeCreate, EmployeeUpdate, SearchFilter, SearchParams};
use crate::state::AppState;

pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EmployeeCreate>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    payload.validate()?;

    let employee = state.store.create(&payload).await?;
    tracing::info!(employee_id = employee.id, "Created employee");

    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<i64>,
) -> ApiResult<Json<Employee>> {
    state.store.get(employee_id).await.map(Json)
}

pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<i64>,
    Json(changes): Json<EmployeeUpdate>,
) -> ApiResult<Json<Employee>> {
    changes.validate()?;

    let employee = state.store.update(employee_id, changes).await?;
    tracing::info!(employee_id, "Updated employee");

    Ok(Json(employee))
}

pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    Path(employee_id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store.delete(employee_id).await?;
    tracing::info!(employee_id, "Deleted employee");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn search_employees(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Vec<Employee>>> {
    let filter = SearchFilter::try_from(params)?;

    let employees = state.store.search(&filter).await?;
    tracing::info!(count = employees.len(), "Search returned employees");

    Ok(Json(employees))
}
