use crate::chat::{self, ChatMessage};
use crate::errors::AppError;
use crate::flow::Effect;
use crate::matrix::TaskMatrix;
use crate::models::{
    ChatSendRequest, ChunkRequest, MatrixAddRequest, MatrixDeleteRequest, MatrixMoveRequest,
    Resource, SleepQuery, TaskToggleRequest, VoiceToggleRequest,
};
use crate::progress::ProgressEvent;
use crate::session::SessionSnapshot;
use crate::state::AppState;
use crate::stats::{StressTrend, build_trend_at};
use crate::stress_check::StressCheckEvent;
use crate::tools::{self, Bedtime, DayPlan};
use crate::triage::TriageEvent;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub snapshot: SessionSnapshot,
    pub effects: Vec<Effect>,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.config.username))
}

pub async fn get_session(State(state): State<AppState>) -> Result<Json<SessionSnapshot>, AppError> {
    {
        let mut session = state.session.lock().await;
        if session.roll_over(today()) {
            info!("new day, daily tasks reset");
            session.store.persist().await?;
        }
    }
    Ok(Json(state.snapshot().await))
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(payload): Json<TaskToggleRequest>,
) -> Result<Json<EventResponse>, AppError> {
    let task_id = task_id.trim();
    if task_id.is_empty() {
        return Err(AppError::bad_request("task id cannot be empty"));
    }

    {
        let mut session = state.session.lock().await;
        let progress = session.progress_on(today());
        if payload.completed {
            progress.complete_task(task_id, payload.points);
        } else {
            progress.uncomplete_task(task_id, payload.points);
        }
        session.save_progress();
        session.store.persist().await?;
    }

    Ok(Json(respond(&state, Vec::new()).await))
}

pub async fn water_plant(State(state): State<AppState>) -> Result<Json<EventResponse>, AppError> {
    let event = {
        let mut session = state.session.lock().await;
        let event = session.progress_on(today()).water_plant()?;
        session.save_progress();
        session.store.persist().await?;
        event
    };

    let effects = match event {
        Some(ProgressEvent::LeveledUp { level }) => vec![Effect::Celebrate { level }],
        None => Vec::new(),
    };
    Ok(Json(respond(&state, effects).await))
}

pub async fn stress_check_event(
    State(state): State<AppState>,
    Json(event): Json<StressCheckEvent>,
) -> Result<Json<EventResponse>, AppError> {
    let effects = state.session.lock().await.apply_stress_check(event)?;
    let rendered = state.run_effects(effects).await;
    Ok(Json(respond(&state, rendered).await))
}

pub async fn triage_event(
    State(state): State<AppState>,
    Json(event): Json<TriageEvent>,
) -> Result<Json<EventResponse>, AppError> {
    let effects = state.session.lock().await.apply_triage(event)?;
    let rendered = state.run_effects(effects).await;
    Ok(Json(respond(&state, rendered).await))
}

pub async fn send_chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatSendRequest>,
) -> Result<Json<EventResponse>, AppError> {
    let message = chat::validate_message(&payload.message)?;

    let voice_enabled = {
        let mut session = state.session.lock().await;
        session.chat.push(ChatMessage::user(message));
        session.chat.voice_enabled
    };

    let effects = match state.backend.chat(message).await {
        Ok(reply) => chat::route_reply(&reply, voice_enabled),
        Err(err) => {
            warn!("chat request failed: {err}");
            chat::connection_failure()
        }
    };

    let rendered = state.run_effects(effects).await;
    Ok(Json(respond(&state, rendered).await))
}

pub async fn clear_chat(State(state): State<AppState>) -> Json<EventResponse> {
    state.session.lock().await.chat.clear();
    state.escalation.lock().await.clear_banner();
    Json(respond(&state, Vec::new()).await)
}

pub async fn set_voice(
    State(state): State<AppState>,
    Json(payload): Json<VoiceToggleRequest>,
) -> Json<EventResponse> {
    state.session.lock().await.chat.voice_enabled = payload.enabled;
    Json(respond(&state, Vec::new()).await)
}

pub async fn close_panic(State(state): State<AppState>) -> Json<EventResponse> {
    state.escalation.lock().await.hide_overlay();
    Json(respond(&state, Vec::new()).await)
}

pub async fn close_helpline(State(state): State<AppState>) -> Json<EventResponse> {
    state.escalation.lock().await.close_helpline();
    Json(respond(&state, Vec::new()).await)
}

pub async fn request_counselor(State(state): State<AppState>) -> Json<EventResponse> {
    let rendered = state.run_effects(vec![Effect::OpenTriage]).await;
    Json(respond(&state, rendered).await)
}

pub async fn get_resources(State(state): State<AppState>) -> Result<Json<Vec<Resource>>, AppError> {
    Ok(Json(state.backend.resources().await?))
}

pub async fn get_stress_trend(State(state): State<AppState>) -> Result<Json<StressTrend>, AppError> {
    let history = state.backend.stress_history().await?;
    Ok(Json(build_trend_at(today(), &history)))
}

pub async fn get_matrix(State(state): State<AppState>) -> Json<TaskMatrix> {
    Json(state.session.lock().await.matrix.clone())
}

pub async fn add_matrix_task(
    State(state): State<AppState>,
    Json(payload): Json<MatrixAddRequest>,
) -> Result<Json<TaskMatrix>, AppError> {
    update_matrix(&state, |matrix| matrix.add(payload.quadrant, &payload.text)).await
}

pub async fn move_matrix_task(
    State(state): State<AppState>,
    Json(payload): Json<MatrixMoveRequest>,
) -> Result<Json<TaskMatrix>, AppError> {
    update_matrix(&state, |matrix| {
        matrix.move_task(payload.from, payload.index, payload.to)
    })
    .await
}

pub async fn delete_matrix_task(
    State(state): State<AppState>,
    Json(payload): Json<MatrixDeleteRequest>,
) -> Result<Json<TaskMatrix>, AppError> {
    update_matrix(&state, |matrix| {
        matrix.delete(payload.quadrant, payload.index).map(|_| ())
    })
    .await
}

pub async fn sleep_calculator(Query(query): Query<SleepQuery>) -> Result<Json<Vec<Bedtime>>, AppError> {
    let wake = tools::parse_wake_time(&query.wake)?;
    Ok(Json(tools::bedtimes(wake)))
}

pub async fn chunk_task(Json(payload): Json<ChunkRequest>) -> Result<Json<Vec<DayPlan>>, AppError> {
    Ok(Json(tools::chunk_task(&payload.task, payload.days)?))
}

async fn update_matrix(
    state: &AppState,
    change: impl FnOnce(&mut TaskMatrix) -> Result<(), crate::flow::FlowError>,
) -> Result<Json<TaskMatrix>, AppError> {
    let mut session = state.session.lock().await;
    change(&mut session.matrix)?;
    session.save_matrix();
    session.store.persist().await?;
    Ok(Json(session.matrix.clone()))
}

async fn respond(state: &AppState, effects: Vec<Effect>) -> EventResponse {
    EventResponse {
        snapshot: state.snapshot().await,
        effects,
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::Session;
    use crate::storage::{KEY_COMPLETED_TODAY, KEY_LAST_DATE, KvStore, temp_path};
    use chrono::Duration;

    #[tokio::test]
    async fn session_read_persists_a_day_rollover() {
        let path = temp_path("handlers_rollover");
        let yesterday = today() - Duration::days(1);
        let mut session = Session::load(KvStore::new(&path), "friend", yesterday);
        session.progress.complete_task("walk", 3);
        session.save_progress();
        let state = AppState::new(Config::default(), session);

        let Json(snapshot) = get_session(State(state)).await.unwrap();
        assert!(snapshot.progress.completed_task_ids.is_empty());

        let stored = KvStore::open(&path).await;
        assert_eq!(stored.get(KEY_LAST_DATE), Some(today().format("%Y-%m-%d").to_string().as_str()));
        assert_eq!(stored.get(KEY_COMPLETED_TODAY), Some("[]"));
        let _ = std::fs::remove_file(path);
    }
}
