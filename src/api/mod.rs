use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use validator::Validate;

use crate::analysis::stats::{AttendanceWarning, GradeBand};
use crate::analysis::{
    attendance_insights, classify_subjects, student_average, subject_means, Advisor, Roster,
};
use crate::ingest::Document;
use crate::lesson::{self, LessonPlanRequest};
use crate::providers::traits::SharedProvider;
use crate::quiz::{self, Difficulty};
use crate::rag::RagEngine;
use crate::session::ChatSession;
use crate::storage::Database;

#[derive(Clone)]
pub struct AppState {
    engine: Arc<RagEngine>,
    advisor: Arc<Advisor>,
    provider: SharedProvider,
    fallback: Option<SharedProvider>,
    db: Arc<Database>,
    // One counselling conversation per server session, matching the
    // single-user page model.
    session: Arc<RwLock<ChatSession>>,
}

#[derive(Serialize)]
struct ApiResponse {
    status: String,
}

fn error_response(code: StatusCode, message: impl Into<String>) -> Response {
    (
        code,
        Json(ApiResponse {
            status: message.into(),
        }),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Class,
    Student,
    Attendance,
    Ask,
}

#[derive(Deserialize, Validate)]
pub struct AnalyzeRequest {
    /// Raw CSV text of the gradebook.
    #[validate(length(min = 1, max = 1000000))]
    csv: String,
    kind: AnalysisKind,
    student: Option<String>,
    question: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    insights: Vec<String>,
    suggestions: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct QuizRequest {
    #[validate(length(min = 1, max = 200))]
    topic: String,
    difficulty: Option<String>,
    num_questions: Option<u32>,
}

#[derive(Serialize)]
pub struct QuizResponse {
    topic: String,
    questions: Vec<crate::quiz::QuizQuestion>,
}

#[derive(Deserialize, Validate)]
pub struct PlanRequest {
    #[validate(length(min = 1, max = 4000))]
    unit_details: String,
    session_hours: u32,
    num_sessions: u32,
}

#[derive(Serialize)]
pub struct PlanResponse {
    plan: String,
    motivation: Option<String>,
}

#[derive(Deserialize, Validate)]
pub struct CounselRequest {
    #[validate(length(min = 1, max = 1000))]
    message: String,
}

#[derive(Serialize)]
pub struct CounselResponse {
    response: String,
    session_id: String,
}

#[derive(Deserialize, Validate)]
pub struct SummarizeRequest {
    /// Pre-extracted lesson text.
    #[validate(length(min = 1, max = 1000000))]
    text: String,
    source: Option<String>,
}

#[derive(Serialize)]
pub struct SummarizeResponse {
    summary: String,
}

/// Create and configure the API router
pub fn create_api(
    engine: Arc<RagEngine>,
    provider: SharedProvider,
    fallback: Option<SharedProvider>,
    db: Arc<Database>,
) -> Router {
    let advisor = Arc::new(Advisor::new(provider.clone(), fallback.clone()));

    let state = AppState {
        engine,
        advisor,
        provider,
        fallback,
        db,
        session: Arc::new(RwLock::new(ChatSession::new())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_check))
        .route("/analyze", post(analyze_handler))
        .route("/quiz", post(quiz_handler))
        .route("/plan", post(plan_handler))
        .route("/counsel", post(counsel_handler))
        .route("/summarize", post(summarize_handler))
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Response {
    Json(ApiResponse {
        status: "Server is running and healthy".to_string(),
    })
    .into_response()
}

async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return error_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", e));
    }

    // A malformed gradebook stops here; nothing downstream runs.
    let roster = match Roster::from_csv(&request.csv) {
        Ok(roster) => roster,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };

    match request.kind {
        AnalysisKind::Class => {
            let means = subject_means(&roster);
            let (weak, strong) = classify_subjects(&means);

            let mut insights = vec!["Subjects where students are performing well:".to_string()];
            insights.extend(
                strong
                    .iter()
                    .map(|(subject, avg)| format!("- {}: {:.2}/100", subject, avg)),
            );
            insights.push("Subjects where students are struggling:".to_string());
            insights.extend(
                weak.iter()
                    .map(|(subject, avg)| format!("- {}: {:.2}/100", subject, avg)),
            );

            let suggestions = state.advisor.class_suggestions(&means).await;
            Json(AnalyzeResponse {
                insights,
                suggestions: Some(suggestions),
            })
            .into_response()
        }
        AnalysisKind::Student => {
            let Some(name) = request.student.as_deref() else {
                return error_response(StatusCode::BAD_REQUEST, "Missing 'student' field");
            };
            let Some(student) = roster.student(name) else {
                return error_response(
                    StatusCode::NOT_FOUND,
                    format!("No student named '{}' in the gradebook", name),
                );
            };

            let mut insights = vec![
                format!("Average Score: {:.2}/100", student_average(student)),
                format!("Attendance: {}%", student.attendance),
            ];
            for (subject, mark) in roster.subjects.iter().zip(student.marks.iter()) {
                insights.push(format!(
                    "{}: {} ({}/100)",
                    subject,
                    GradeBand::for_mark(*mark).label(),
                    mark
                ));
            }
            if let Some(warning) = AttendanceWarning::for_attendance(student.attendance) {
                insights.push(warning.message().to_string());
            }

            let suggestions = state
                .advisor
                .student_suggestions(student, &roster.subjects)
                .await;
            Json(AnalyzeResponse {
                insights,
                suggestions: Some(suggestions),
            })
            .into_response()
        }
        AnalysisKind::Attendance => Json(AnalyzeResponse {
            insights: attendance_insights(&roster).render_lines(),
            suggestions: None,
        })
        .into_response(),
        AnalysisKind::Ask => {
            let Some(question) = request.question.as_deref() else {
                return error_response(StatusCode::BAD_REQUEST, "Missing 'question' field");
            };
            match state.advisor.ask(&roster, question).await {
                Ok(answer) => Json(AnalyzeResponse {
                    insights: Vec::new(),
                    suggestions: Some(answer),
                })
                .into_response(),
                Err(e) => error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("AI error: {}", e),
                ),
            }
        }
    }
}

async fn quiz_handler(State(state): State<AppState>, Json(request): Json<QuizRequest>) -> Response {
    if let Err(e) = request.validate() {
        return error_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", e));
    }

    let difficulty = match request.difficulty.as_deref() {
        None => Difficulty::Intermediate,
        Some(text) => match Difficulty::from_str(text) {
            Ok(difficulty) => difficulty,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        },
    };
    let count = request.num_questions.unwrap_or(5).clamp(1, 20);

    match quiz::generate(
        &state.provider,
        state.fallback.as_ref(),
        &request.topic,
        difficulty,
        count,
    )
    .await
    {
        Ok(quiz) => Json(QuizResponse {
            topic: quiz.topic,
            questions: quiz.questions,
        })
        .into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("AI error: {}", e),
        ),
    }
}

async fn plan_handler(State(state): State<AppState>, Json(request): Json<PlanRequest>) -> Response {
    if let Err(e) = request.validate() {
        return error_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", e));
    }

    let plan_request = LessonPlanRequest {
        unit_details: request.unit_details,
        session_hours: request.session_hours,
        num_sessions: request.num_sessions,
    };
    if let Err(e) = plan_request.validate() {
        return error_response(StatusCode::BAD_REQUEST, e.to_string());
    }

    let plan = match lesson::generate_plan(&state.provider, state.fallback.as_ref(), &plan_request)
        .await
    {
        Ok(plan) => plan,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("AI error: {}", e),
            )
        }
    };

    let motivation = lesson::motivational_line(&state.provider).await.ok();

    Json(PlanResponse { plan, motivation }).into_response()
}

async fn counsel_handler(
    State(state): State<AppState>,
    Json(request): Json<CounselRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return error_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", e));
    }

    let mut session = state.session.write().await;
    let response = match state.engine.counsel(&mut session, &request.message).await {
        Ok(response) => response,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("AI error: {}", e),
            )
        }
    };

    for (role, text) in [("user", request.message.as_str()), ("assistant", response.as_str())] {
        if let Err(e) = state
            .db
            .save_transcript(session.id.clone(), role.to_string(), text.to_string())
            .await
        {
            eprintln!("Warning: Failed to save transcript: {}", e);
        }
    }

    Json(CounselResponse {
        response,
        session_id: session.id.clone(),
    })
    .into_response()
}

async fn summarize_handler(
    State(state): State<AppState>,
    Json(request): Json<SummarizeRequest>,
) -> Response {
    if let Err(e) = request.validate() {
        return error_response(StatusCode::BAD_REQUEST, format!("Invalid request: {}", e));
    }

    let document = Document {
        source: request.source.unwrap_or_else(|| "upload".to_string()),
        text: request.text,
    };

    match state.engine.summarize_document(&document).await {
        Ok(summary) => Json(SummarizeResponse { summary }).into_response(),
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("AI error: {}", e),
        ),
    }
}
