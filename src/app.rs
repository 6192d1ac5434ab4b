use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/session", get(handlers::get_session))
        .route("/api/progress/tasks/:task_id", post(handlers::toggle_task))
        .route("/api/progress/water", post(handlers::water_plant))
        .route("/api/stress-check", post(handlers::stress_check_event))
        .route("/api/triage", post(handlers::triage_event))
        .route("/api/chat", post(handlers::send_chat))
        .route("/api/chat/clear", post(handlers::clear_chat))
        .route("/api/chat/voice", post(handlers::set_voice))
        .route("/api/escalation/panic/close", post(handlers::close_panic))
        .route("/api/escalation/helpline/close", post(handlers::close_helpline))
        .route(
            "/api/escalation/request-counselor",
            post(handlers::request_counselor),
        )
        .route("/api/resources", get(handlers::get_resources))
        .route("/api/stress-trend", get(handlers::get_stress_trend))
        .route("/api/matrix", get(handlers::get_matrix))
        .route("/api/matrix/tasks", post(handlers::add_matrix_task))
        .route("/api/matrix/move", post(handlers::move_matrix_task))
        .route("/api/matrix/delete", post(handlers::delete_matrix_task))
        .route("/api/tools/sleep", get(handlers::sleep_calculator))
        .route("/api/tools/chunk", post(handlers::chunk_task))
        .with_state(state)
}
