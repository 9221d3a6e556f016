//! Bracket web server: JSON API for tournament admins and entrants.
//! Run with: cargo run --bin web
//! Configured from env: HOST, PORT, ADMIN_TOKEN, SESSION_SECRET (see `bracket_web::config`).

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, post,
    web::{Bytes, Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder, ResponseError,
};
use bracket_web::{
    admin_token_matches, Actor, Config, MatchId, ParticipantId, Role, TournamentError,
    TournamentId, TournamentService, TournamentStatus,
};
use serde::{Deserialize, Serialize};

const SESSION_ACTOR_KEY: &str = "actor";

/// Shared by all workers.
struct AppContext {
    service: TournamentService,
    admin_token: Option<String>,
}

type AppState = Data<AppContext>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct SignInBody {
    name: String,
    #[serde(default)]
    admin_token: Option<String>,
}

#[derive(Deserialize)]
struct CreateTournamentBody {
    name: String,
}

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default)]
    status: Option<TournamentStatus>,
}

#[derive(Deserialize)]
struct RegisterBody {
    /// Admins may register someone else by name; members always register themselves.
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
struct ReportResultBody {
    winner_id: ParticipantId,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

#[derive(Deserialize)]
struct TournamentParticipantPath {
    id: TournamentId,
    participant_id: ParticipantId,
}

#[derive(Deserialize)]
struct TournamentMatchPath {
    id: TournamentId,
    match_id: MatchId,
}

fn respond<T: Serialize>(result: Result<T, TournamentError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => e.error_response(),
    }
}

fn current_actor(session: &Session) -> Option<Actor> {
    session.get::<Actor>(SESSION_ACTOR_KEY).ok().flatten()
}

fn require_actor(session: &Session) -> Result<Actor, HttpResponse> {
    current_actor(session).ok_or_else(|| {
        HttpResponse::Unauthorized().json(serde_json::json!({ "error": "Sign in first" }))
    })
}

fn require_admin(session: &Session) -> Result<Actor, HttpResponse> {
    let actor = require_actor(session)?;
    if !actor.is_admin() {
        return Err(HttpResponse::Forbidden().json(serde_json::json!({ "error": "Admins only" })));
    }
    Ok(actor)
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "bracket-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// Sign in with a display name; a matching admin token grants the admin role.
#[post("/api/session")]
async fn api_sign_in(state: AppState, session: Session, body: Json<SignInBody>) -> HttpResponse {
    let name = body.name.trim();
    if name.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({ "error": "Name is required" }));
    }
    let role = match (&state.admin_token, &body.admin_token) {
        (Some(expected), Some(given)) if admin_token_matches(expected, given) => Role::Admin,
        (_, Some(_)) => {
            let body = serde_json::json!({ "error": "Wrong admin token" });
            return HttpResponse::Forbidden().json(body);
        }
        _ => Role::Member,
    };
    let actor = Actor::new(name, role);
    if let Err(e) = session.insert(SESSION_ACTOR_KEY, &actor) {
        log::error!("Could not store session: {}", e);
        return HttpResponse::InternalServerError().body("session error");
    }
    log::info!("{} signed in as {:?}", actor.name, actor.role);
    HttpResponse::Ok().json(actor)
}

#[get("/api/session")]
async fn api_session(session: Session) -> HttpResponse {
    match require_actor(&session) {
        Ok(actor) => HttpResponse::Ok().json(actor),
        Err(resp) => resp,
    }
}

#[delete("/api/session")]
async fn api_sign_out(session: Session) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// List tournaments, optionally filtered by ?status=.
#[get("/api/tournaments")]
async fn api_list_tournaments(state: AppState, query: Query<ListQuery>) -> HttpResponse {
    HttpResponse::Ok().json(state.service.list_tournaments(query.status))
}

#[post("/api/tournaments")]
async fn api_create_tournament(
    state: AppState,
    session: Session,
    body: Json<CreateTournamentBody>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    respond(state.service.create_tournament(&body.name))
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.service.tournament(path.id))
}

#[post("/api/tournaments/{id}/registration/open")]
async fn api_open_registration(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    respond(state.service.open_registration(path.id).await)
}

#[post("/api/tournaments/{id}/cancel")]
async fn api_cancel(state: AppState, session: Session, path: Path<TournamentPath>) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    respond(state.service.cancel(path.id).await)
}

#[get("/api/tournaments/{id}/participants")]
async fn api_participants(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.service.participants(path.id))
}

/// Register: members sign up themselves, admins may add anyone by name.
#[post("/api/tournaments/{id}/participants")]
async fn api_register(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
    body: Option<Json<RegisterBody>>,
) -> HttpResponse {
    let actor = match require_actor(&session) {
        Ok(actor) => actor,
        Err(resp) => return resp,
    };
    let requested = body.and_then(|b| b.into_inner().display_name);
    let name = match requested {
        Some(name) if actor.is_admin() => name,
        _ => actor.name,
    };
    respond(state.service.register_participant(path.id, &name).await)
}

/// Bulk registration from a CSV body with a `display_name` (or `name`) column.
#[post("/api/tournaments/{id}/participants/import")]
async fn api_import_participants(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
    body: Bytes,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    respond(state.service.import_participants_csv(path.id, &body[..]).await)
}

#[delete("/api/tournaments/{id}/participants/{participant_id}")]
async fn api_remove_participant(
    state: AppState,
    session: Session,
    path: Path<TournamentParticipantPath>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    respond(state.service.remove_participant(path.id, path.participant_id).await)
}

#[get("/api/tournaments/{id}/bracket")]
async fn api_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(state.service.bracket(path.id))
}

/// Seed round 1 from the registered participants.
#[post("/api/tournaments/{id}/bracket")]
async fn api_generate_bracket(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    respond(state.service.generate_bracket(path.id).await)
}

/// Drop all matches and reopen registration (for a bracket that got stuck).
#[delete("/api/tournaments/{id}/bracket")]
async fn api_clear_bracket(
    state: AppState,
    session: Session,
    path: Path<TournamentPath>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    respond(state.service.clear_bracket(path.id).await)
}

#[post("/api/tournaments/{id}/matches/{match_id}/start")]
async fn api_start_match(
    state: AppState,
    session: Session,
    path: Path<TournamentMatchPath>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    respond(state.service.start_match(path.id, path.match_id).await)
}

#[post("/api/tournaments/{id}/matches/{match_id}/result")]
async fn api_report_result(
    state: AppState,
    session: Session,
    path: Path<TournamentMatchPath>,
    body: Json<ReportResultBody>,
) -> HttpResponse {
    if let Err(resp) = require_admin(&session) {
        return resp;
    }
    respond(
        state
            .service
            .report_result(path.id, path.match_id, body.winner_id)
            .await,
    )
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    if config.admin_token.is_none() {
        log::warn!("ADMIN_TOKEN is not set; nobody can sign in as admin");
    }
    let key = match &config.session_secret {
        Some(secret) => Key::from(secret.as_slice()),
        None => {
            log::warn!("SESSION_SECRET is not set; sessions will not survive a restart");
            Key::generate()
        }
    };

    let state = Data::new(AppContext {
        service: TournamentService::new(),
        admin_token: config.admin_token.clone(),
    });

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_secure(false)
                    .build(),
            )
            .service(api_health)
            .service(favicon)
            .service(api_sign_in)
            .service(api_session)
            .service(api_sign_out)
            .service(api_list_tournaments)
            .service(api_create_tournament)
            .service(api_get_tournament)
            .service(api_open_registration)
            .service(api_cancel)
            .service(api_participants)
            .service(api_register)
            .service(api_import_participants)
            .service(api_remove_participant)
            .service(api_bracket)
            .service(api_generate_bracket)
            .service(api_clear_bracket)
            .service(api_start_match)
            .service(api_report_result)
    })
    .bind(bind)?
    .run()
    .await
}
