//! Router and request handlers.
//!
//! # Responsibility
//! - Translate form posts into working-set operations.
//! - Render the working set as HTML pages and JSON dumps.
//!
//! # Invariants
//! - Every mutating route redirects, including when the input was ignored.
//! - Handlers hold the service lock for the whole memory-then-store write.

use crate::error::AppError;
use crate::render;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tasklist_core::{split_composite_where, AnyStore, Category, Task, TodoService};
use tokio::sync::Mutex;

pub const TODO_LIST_PATH: &str = "/to-do-list";
pub const CATEGORIES_PATH: &str = "/categories";

const APP_JS: &str = include_str!("../static/app.js");

/// Service shared by all handlers; the mutex serializes mutations.
pub type SharedService = Arc<Mutex<TodoService<AnyStore>>>;

#[derive(Clone)]
pub struct AppState {
    pub service: SharedService,
    pub owner_name: Arc<str>,
}

impl AppState {
    pub fn new(service: TodoService<AnyStore>, owner_name: &str) -> Self {
        Self {
            service: Arc::new(Mutex::new(service)),
            owner_name: Arc::from(owner_name),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AddTaskForm {
    task: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TickTaskForm {
    check: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveTaskForm {
    #[serde(rename = "tasktoRemove")]
    task_to_remove: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddCategoryForm {
    new_category: Option<String>,
    color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoveCategoryForm {
    #[serde(rename = "categorytoRemove")]
    category_to_remove: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to(TODO_LIST_PATH) }))
        .route(TODO_LIST_PATH, get(todo_list))
        .route(CATEGORIES_PATH, get(categories))
        .route("/api/outstanding-tasks", get(outstanding_tasks))
        .route("/api/completed-tasks", get(completed_tasks))
        .route("/api/categories", get(category_list))
        .route("/addtask", post(add_task))
        .route("/ticktask", post(tick_task))
        .route("/removetask", post(remove_task))
        .route("/addcategory", post(add_category))
        .route("/removecategory", post(remove_category))
        .route("/resetcategories", post(reset_categories))
        .route("/static/app.js", get(app_js))
        .with_state(state)
}

async fn todo_list(State(state): State<AppState>) -> Html<String> {
    let service = state.service.lock().await;
    Html(render::todo_list_page(&state.owner_name, service.working_set()))
}

async fn categories(State(state): State<AppState>) -> Html<String> {
    let service = state.service.lock().await;
    Html(render::categories_page(&state.owner_name, service.working_set()))
}

async fn outstanding_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.service.lock().await.outstanding().to_vec())
}

async fn completed_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.service.lock().await.completed().to_vec())
}

async fn category_list(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.service.lock().await.categories().to_vec())
}

async fn add_task(
    State(state): State<AppState>,
    Form(form): Form<AddTaskForm>,
) -> Result<Redirect, AppError> {
    let mut service = state.service.lock().await;
    service.add_task(form.task.as_deref(), form.category.as_deref())?;
    Ok(Redirect::to(TODO_LIST_PATH))
}

async fn tick_task(
    State(state): State<AppState>,
    Form(form): Form<TickTaskForm>,
) -> Result<Redirect, AppError> {
    let mut service = state.service.lock().await;
    let parts = form.check.as_deref().and_then(|value| {
        split_composite_where(value, |name, category| {
            service.working_set().is_outstanding(name, category)
        })
    });
    service.tick_task(parts.map(|(name, _)| name), parts.map(|(_, category)| category))?;
    Ok(Redirect::to(TODO_LIST_PATH))
}

async fn remove_task(
    State(state): State<AppState>,
    Form(form): Form<RemoveTaskForm>,
) -> Result<Redirect, AppError> {
    let mut service = state.service.lock().await;
    let parts = form.task_to_remove.as_deref().and_then(|value| {
        split_composite_where(value, |name, category| {
            service.working_set().is_completed(name, category)
        })
    });
    service.remove_task(parts.map(|(name, _)| name), parts.map(|(_, category)| category))?;
    Ok(Redirect::to(TODO_LIST_PATH))
}

async fn add_category(
    State(state): State<AppState>,
    Form(form): Form<AddCategoryForm>,
) -> Result<Redirect, AppError> {
    let mut service = state.service.lock().await;
    service.add_category(form.new_category.as_deref(), form.color.as_deref())?;
    Ok(Redirect::to(CATEGORIES_PATH))
}

async fn remove_category(
    State(state): State<AppState>,
    Form(form): Form<RemoveCategoryForm>,
) -> Result<Redirect, AppError> {
    let mut service = state.service.lock().await;
    let parts = form.category_to_remove.as_deref().and_then(|value| {
        split_composite_where(value, |name, color| {
            service.working_set().has_category_colored(name, color)
        })
    });
    service.remove_category(parts.map(|(name, _)| name), parts.map(|(_, color)| color))?;
    Ok(Redirect::to(CATEGORIES_PATH))
}

async fn reset_categories(State(state): State<AppState>) -> Result<Redirect, AppError> {
    state.service.lock().await.reset_categories()?;
    Ok(Redirect::to(CATEGORIES_PATH))
}

async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], APP_JS)
}
