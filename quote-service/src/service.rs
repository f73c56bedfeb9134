use axum::{
    Router,
    extract::{Path, Query, RawQuery, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{Next, from_fn},
    response::{IntoResponse, Json, Redirect, Response},
    routing::{get, post},
};
use dashmap::DashMap;
use quote_flow::{
    Answers, ExitReason, FlowError, FlowRunner, FlowState, InMemorySessionStorage, QuoteFlow,
    Session, SessionStorage, StepId, SubmissionHandle, SubmissionTimeline,
    catalog::{self, Entry, Location, Make},
    from_query, keys, start_over_route,
    validate::field_error,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

use crate::{
    config::ServiceConfig,
    models::{
        ExitPage, ExitQuery, LocationQuery, NavigationResponse, SessionResponse, StepPage,
        SubmissionResponse, VisitRequest, VisitResponse,
    },
};

pub const CORRELATION_HEADER: &str = "x-correlation-id";

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "id": id
        })),
    )
}

fn conflict_error(message: &str, state: &FlowState) -> ApiError {
    (
        StatusCode::CONFLICT,
        Json(json!({
            "error": message,
            "state": state
        })),
    )
}

fn internal_error(message: &str, details: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": message,
            "details": details
        })),
    )
}

fn flow_error(e: FlowError) -> ApiError {
    match &e {
        FlowError::UnknownStep(step) => not_found_error("Unknown step", step),
        FlowError::SessionNotFound(id) => not_found_error("Session not found", id),
        FlowError::IncompleteStep(step) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": e.to_string(),
                "step": step
            })),
        ),
        FlowError::MissingParameters { step, missing } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": e.to_string(),
                "step": step,
                "missing": missing,
                "redirect": start_over_route()
            })),
        ),
        FlowError::MalformedQuery(_) => bad_request_error(&e.to_string()),
        FlowError::TerminalState(state) => conflict_error(&e.to_string(), state),
        FlowError::StorageError(details) => {
            error!(details = %details, "session storage failed");
            internal_error("Session storage failed", details)
        }
    }
}

/// Inline contact field messages for a rejected Continue.
fn with_field_errors(mut err: ApiError, answers: &Answers) -> ApiError {
    let errors: serde_json::Map<String, Value> = [keys::EMAIL, keys::PHONE]
        .into_iter()
        .filter_map(|field| field_error(field, answers).map(|msg| (field.to_string(), json!(msg))))
        .collect();
    if !errors.is_empty() {
        err.1.0["field_errors"] = Value::Object(errors);
    }
    err
}

#[derive(Clone)]
pub struct AppState {
    pub session_storage: Arc<dyn SessionStorage>,
    pub flow_runner: FlowRunner,
    pub submissions: Arc<DashMap<String, SubmissionHandle>>,
    pub timeline: SubmissionTimeline,
}

impl AppState {
    pub fn new(session_storage: Arc<dyn SessionStorage>, timeline: SubmissionTimeline) -> Self {
        let flow_runner = FlowRunner::new(Arc::new(QuoteFlow::standard()), session_storage.clone());
        Self {
            session_storage,
            flow_runner,
            submissions: Arc::new(DashMap::new()),
            timeline,
        }
    }

    fn flow(&self) -> &QuoteFlow {
        self.flow_runner.flow()
    }

    fn session_response(&self, session: Session) -> SessionResponse {
        let view = session
            .state
            .step()
            .and_then(|step| self.flow().view(step, &session.answers).ok());
        SessionResponse::new(session, view)
    }
}

pub fn create_app(config: &ServiceConfig) -> Router {
    info!("Using in-memory session storage");
    let app_state = AppState::new(
        Arc::new(InMemorySessionStorage::new()),
        config.submission_timeline(),
    );
    build_router(app_state)
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/quote/exit", get(exit_page))
        .route("/quote/{step}", get(show_step).post(continue_step))
        .route("/catalog/makes", get(list_makes))
        .route("/catalog/makes/{make}/models", get(list_models))
        .route("/catalog/locations", get(search_locations))
        .route("/sessions", post(start_session))
        .route("/sessions/{session_id}", get(get_session))
        .route("/sessions/{session_id}/visit", post(visit_route))
        .route("/sessions/{session_id}/advance", post(advance_session))
        .route("/sessions/{session_id}/back", post(back_session))
        .route("/sessions/{session_id}/restart", post(restart_session))
        .route(
            "/sessions/{session_id}/submission",
            post(start_submission)
                .get(submission_status)
                .delete(cancel_submission),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(app_state)
}

/// Tag every request with a fresh correlation id and run it inside an
/// `http_request` span carrying that id.
async fn correlation_id_middleware(mut request: Request, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&correlation_id).ok();

    if let Some(value) = &header {
        request.headers_mut().insert(CORRELATION_HEADER, value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Vehicle Transport Quote Service",
        "version": "0.1.0",
        "description": "Multi-step car transport quote wizard with URL-carried answers",
        "endpoints": {
            "GET /quote/{step}?<answers>": "Render data for a step, or redirect to the first step",
            "POST /quote/{step}?<answers>": "Continue from a step with its answers",
            "GET /quote/exit?reason=": "Custom quote page copy",
            "GET /catalog/makes": "Vehicle makes with their models",
            "GET /catalog/makes/{make}/models": "Models for one make",
            "GET /catalog/locations?q=": "Location suggestions",
            "POST /sessions": "Start a quote session",
            "GET /sessions/{session_id}": "Session state",
            "POST /sessions/{session_id}/visit": "Land on a route",
            "POST /sessions/{session_id}/advance": "Continue from the current step",
            "POST /sessions/{session_id}/back": "Go back one step",
            "POST /sessions/{session_id}/restart": "Start over",
            "POST /sessions/{session_id}/submission": "Start the submission timeline",
            "GET /sessions/{session_id}/submission": "Submission status",
            "DELETE /sessions/{session_id}/submission": "Cancel the submission",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

fn parse_step(step: &str) -> Result<StepId, ApiError> {
    step.parse::<StepId>().map_err(flow_error)
}

fn parse_answers(query: Option<String>) -> Result<Answers, ApiError> {
    from_query(query.as_deref().unwrap_or("")).map_err(flow_error)
}

async fn show_step(
    State(state): State<AppState>,
    Path(step): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let step = parse_step(&step)?;
    let answers = parse_answers(query)?;

    if let Err(e) = state.flow().guard(step, &answers) {
        info!(step = %step, error = %e, "deep link without prior answers, redirecting");
        return Ok(Redirect::to(&start_over_route()).into_response());
    }

    let view = state.flow().view(step, &answers).map_err(flow_error)?;
    Ok(Json(StepPage::new(view)).into_response())
}

async fn continue_step(
    State(state): State<AppState>,
    Path(step): Path<String>,
    RawQuery(query): RawQuery,
    Json(step_answers): Json<Answers>,
) -> ApiResult<NavigationResponse> {
    let step = parse_step(&step)?;
    let persisted = parse_answers(query)?;

    state.flow().guard(step, &persisted).map_err(flow_error)?;
    let nav = state
        .flow()
        .advance(step, &persisted, &step_answers)
        .map_err(|e| with_field_errors(flow_error(e), &step_answers))?;

    info!(step = %step, destination = %nav.state, "continue resolved");
    Ok(Json(nav.into()))
}

async fn exit_page(Query(query): Query<ExitQuery>) -> Json<ExitPage> {
    let reason = query
        .reason
        .as_deref()
        .and_then(|r| r.parse::<ExitReason>().ok());
    let copy = ExitReason::copy_for(query.reason.as_deref());

    Json(ExitPage {
        reason,
        title: copy.title,
        description: copy.description,
        start_over: start_over_route(),
    })
}

async fn list_makes() -> Json<&'static [Make]> {
    Json(catalog::makes())
}

async fn list_models(Path(make): Path<String>) -> ApiResult<&'static [Entry]> {
    catalog::find_make(&make)
        .map(|found| Json(found.models))
        .ok_or_else(|| not_found_error("Unknown make", &make))
}

async fn search_locations(Query(query): Query<LocationQuery>) -> Json<Vec<&'static Location>> {
    Json(catalog::search_locations(&query.q))
}

async fn start_session(State(state): State<AppState>) -> ApiResult<SessionResponse> {
    let session = state.flow_runner.start().await.map_err(flow_error)?;
    Ok(Json(state.session_response(session)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    let session = state.flow_runner.get(&session_id).await.map_err(flow_error)?;
    Ok(Json(state.session_response(session)))
}

async fn visit_route(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<VisitRequest>,
) -> ApiResult<VisitResponse> {
    let visit = state
        .flow_runner
        .visit(&session_id, &request.route)
        .await
        .map_err(flow_error)?;

    Ok(Json(VisitResponse {
        direction: visit.direction,
        admitted: visit.admitted,
        session: state.session_response(visit.session),
    }))
}

async fn advance_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(step_answers): Json<Answers>,
) -> ApiResult<NavigationResponse> {
    let nav = state
        .flow_runner
        .advance(&session_id, &step_answers)
        .await
        .map_err(|e| with_field_errors(flow_error(e), &step_answers))?;
    Ok(Json(nav.into()))
}

async fn back_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<NavigationResponse> {
    let nav = state
        .flow_runner
        .back(&session_id)
        .await
        .map_err(flow_error)?;
    Ok(Json(nav.into()))
}

async fn restart_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionResponse> {
    let session = state
        .flow_runner
        .restart(&session_id)
        .await
        .map_err(flow_error)?;
    state.submissions.remove(&session_id);
    Ok(Json(state.session_response(session)))
}

async fn start_submission(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SubmissionResponse> {
    let session = state.flow_runner.get(&session_id).await.map_err(flow_error)?;
    if session.state != FlowState::Submitted {
        warn!(session_id = %session_id, state = %session.state, "submission requested before contact step");
        return Err(conflict_error(
            "Contact details have not been submitted",
            &session.state,
        ));
    }

    let handle = SubmissionHandle::spawn(state.timeline.clone());
    let status = handle.status();
    state.submissions.insert(session_id.clone(), handle);
    info!(session_id = %session_id, "submission started");

    Ok(Json(SubmissionResponse { session_id, status }))
}

async fn submission_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SubmissionResponse> {
    let status = state
        .submissions
        .get(&session_id)
        .map(|handle| handle.status())
        .ok_or_else(|| not_found_error("No submission for session", &session_id))?;
    Ok(Json(SubmissionResponse { session_id, status }))
}

async fn cancel_submission(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SubmissionResponse> {
    let status = state
        .submissions
        .get(&session_id)
        .map(|handle| {
            handle.cancel();
            handle.status()
        })
        .ok_or_else(|| not_found_error("No submission for session", &session_id))?;
    Ok(Json(SubmissionResponse { session_id, status }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, header},
    };
    use std::time::Duration;
    use tower::ServiceExt;

    const LOCATED: &str =
        "pick=Sydney%2C%20NSW&pickRef=sydney-nsw&drop=Perth%2C%20WA&dropRef=perth-wa";

    fn app() -> Router {
        build_router(AppState::new(
            Arc::new(InMemorySessionStorage::new()),
            SubmissionTimeline::with_durations(Duration::from_secs(60), Duration::from_secs(60)),
        ))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = axum::http::Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn health_and_correlation_header() {
        let request = axum::http::Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(CORRELATION_HEADER));
    }

    #[tokio::test]
    async fn deep_link_redirects_to_first_step() {
        let request = axum::http::Request::builder()
            .uri("/quote/auction")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/quote/location");
    }

    #[tokio::test]
    async fn step_pages_render() {
        let app = app();

        let (status, page) = send(&app, Method::GET, "/quote/location", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["number"], 1);
        assert_eq!(page["total_steps"], 5);
        assert_eq!(page["continue_label"], "Continue");

        let (status, page) = send(&app, Method::GET, &format!("/quote/vehicle?{LOCATED}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["answers"]["pickRef"], "sydney-nsw");
        assert!(page.get("quote_summary").is_none());

        let (status, _) = send(&app, Method::GET, "/quote/payment", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, "/quote/location?pick=%FF", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn contact_page_includes_quote_summary() {
        let uri = format!(
            "/quote/contact?{LOCATED}&make=bmw&model=x5&age=under30&drive=driveable&auction=non-auction&carValue=90000"
        );
        let (status, page) = send(&app(), Method::GET, &uri, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(page["continue_label"], "Get My Quote");
        assert_eq!(page["quote_summary"]["vehicle"], "BMW X5");
        assert_eq!(page["quote_summary"]["specs"], "1 custom spec");
        assert_eq!(page["quote_summary"]["spec_details"][0]["value"], "$90000 AUD");
    }

    #[tokio::test]
    async fn continue_resolves_next_route_or_exit() {
        let app = app();

        let (status, nav) = send(
            &app,
            Method::POST,
            &format!("/quote/vehicle?{LOCATED}"),
            Some(json!({"make": "toyota", "model": "camry", "age": "under30", "drive": "driveable"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(nav["destination"], "step");
        assert_eq!(nav["step"], "auction");
        assert!(nav["route"].as_str().unwrap().starts_with("/quote/auction?pick="));

        let (status, nav) = send(
            &app,
            Method::POST,
            &format!("/quote/vehicle?{LOCATED}"),
            Some(json!({"make": "toyota", "model": "camry", "age": "over30", "drive": "driveable"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(nav["destination"], "exit");
        assert_eq!(nav["reason"], "vehicle_age");
        assert_eq!(nav["route"], "/quote/exit?reason=vehicle_age");
        assert!(nav["answers"].get("age").is_none());
    }

    #[tokio::test]
    async fn incomplete_continue_is_rejected() {
        let app = app();

        let (status, body) = send(
            &app,
            Method::POST,
            "/quote/location",
            Some(json!({"pick": "Sydney, NSW", "drop": "Perth, WA"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["step"], "location");

        let (status, body) = send(
            &app,
            Method::POST,
            "/quote/dimensions",
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["redirect"], "/quote/location");
    }

    #[tokio::test]
    async fn exit_page_copy() {
        let app = app();

        let (_, page) = send(&app, Method::GET, "/quote/exit?reason=salvage_vehicle", None).await;
        assert_eq!(page["title"], "Salvage Vehicle Transport");
        assert_eq!(page["start_over"], "/quote/location");

        let (_, page) = send(&app, Method::GET, "/quote/exit", None).await;
        assert_eq!(page["title"], "Custom Quote Required");
        assert!(page.get("reason").is_none());
    }

    #[tokio::test]
    async fn catalog_lookups() {
        let app = app();

        let (_, makes) = send(&app, Method::GET, "/catalog/makes", None).await;
        assert_eq!(makes.as_array().unwrap().len(), 14);

        let (status, models) = send(&app, Method::GET, "/catalog/makes/honda/models", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(models[1]["label"], "CR-V");

        let (status, _) = send(&app, Method::GET, "/catalog/makes/lada/models", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, hits) = send(&app, Method::GET, "/catalog/locations?q=syd", None).await;
        assert_eq!(hits[0]["ref"], "sydney-nsw");

        let (_, hits) = send(&app, Method::GET, "/catalog/locations", None).await;
        assert_eq!(hits, json!([]));
    }

    #[tokio::test]
    async fn session_walkthrough_with_submission() {
        let app = app();

        let (status, session) = send(&app, Method::POST, "/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        let id = session["session_id"].as_str().unwrap().to_string();
        assert_eq!(session["page"]["id"], "location");

        let (status, _) = send(&app, Method::POST, &format!("/sessions/{id}/submission"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let steps = [
            json!({"pick": "Sydney, NSW", "pickRef": "sydney-nsw", "drop": "Perth, WA", "dropRef": "perth-wa"}),
            json!({"make": "audi", "model": "q5", "age": "under30", "drive": "driveable"}),
            json!({"auction": "auction", "salvage": "non-salvage"}),
            json!({}),
        ];
        for body in steps {
            let (status, nav) = send(&app, Method::POST, &format!("/sessions/{id}/advance"), Some(body)).await;
            assert_eq!(status, StatusCode::OK, "{nav}");
        }

        let (status, body) = send(
            &app,
            Method::POST,
            &format!("/sessions/{id}/advance"),
            Some(json!({"email": "not-an-email", "phone": "0412 345 678"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["field_errors"]["email"], "Please enter a valid email address");

        let (status, nav) = send(
            &app,
            Method::POST,
            &format!("/sessions/{id}/advance"),
            Some(json!({"email": "kim@example.com", "phone": "0412 345 678"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(nav["destination"], "submitted");

        let (status, sub) = send(&app, Method::POST, &format!("/sessions/{id}/submission"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(matches!(sub["status"]["phase"].as_str(), Some("pending" | "running")));

        let (status, sub) = send(&app, Method::DELETE, &format!("/sessions/{id}/submission"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sub["status"]["phase"], "cancelled");

        let (_, sub) = send(&app, Method::GET, &format!("/sessions/{id}/submission"), None).await;
        assert_eq!(sub["status"]["phase"], "cancelled");

        let (status, _) = send(&app, Method::POST, &format!("/sessions/{id}/back"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, restarted) = send(&app, Method::POST, &format!("/sessions/{id}/restart"), None).await;
        assert_eq!(restarted["state"]["kind"], "step");
        assert_eq!(restarted["answers"], json!({}));

        let (status, _) = send(&app, Method::GET, &format!("/sessions/{id}/submission"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn visits_report_direction() {
        let app = app();
        let (_, session) = send(&app, Method::POST, "/sessions", None).await;
        let id = session["session_id"].as_str().unwrap().to_string();

        let (status, visit) = send(
            &app,
            Method::POST,
            &format!("/sessions/{id}/visit"),
            Some(json!({"route": format!("/quote/vehicle?{LOCATED}")})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(visit["direction"], "forward");
        assert_eq!(visit["admitted"], true);
        assert_eq!(visit["page"]["number"], 2);

        let (_, visit) = send(
            &app,
            Method::POST,
            &format!("/sessions/{id}/visit"),
            Some(json!({"route": "/quote/contact"})),
        )
        .await;
        assert_eq!(visit["admitted"], false);
        assert_eq!(visit["direction"], "back");
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (status, body) = send(&app(), Method::GET, "/sessions/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["id"], "nope");
    }
}
