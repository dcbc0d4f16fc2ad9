use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{error, instrument, warn};

use crate::{
    auth::{
        cookie::{self, extract_cookie, OAUTH_STATE_COOKIE},
        dto::{
            CredentialsRequest, MessageResponse, OAuthCallbackQuery, RegisterRequest,
            SignInResponse, PROVIDERS,
        },
        oauth::new_state,
        services::{self, AuthError},
    },
    errors::AppError,
    state::AppState,
};

const OAUTH_ERROR_REDIRECT: &str = "/auth/signin?error=OAuthSignin";
const OAUTH_DENIED_REDIRECT: &str = "/auth/signin?error=AccessDenied";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/callback/credentials", post(sign_in_credentials))
        .route("/api/auth/signin/google", get(sign_in_google))
        .route(
            "/api/auth/callback/google",
            get(google_callback).post(google_callback),
        )
        .route("/api/auth/session", get(get_session))
        .route("/api/auth/providers", get(providers))
        .route("/api/auth/signout", post(sign_out))
}

fn session_cookie_header(state: &AppState, token: &str) -> String {
    cookie::session_cookie(state.config.session.cookie_secure, state.keys.ttl.as_secs())
        .build(token)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    services::register(state.users.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn sign_in_credentials(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Response, AppError> {
    let user = services::authorize_credentials(state.users.as_ref(), payload).await?;
    let (token, session) = services::issue_session(&state.keys, &user)?;
    let set_cookie = session_cookie_header(&state, &token);
    Ok((
        [(header::SET_COOKIE, set_cookie)],
        Json(SignInResponse { token, session }),
    )
        .into_response())
}

#[instrument(skip(state))]
pub async fn sign_in_google(State(state): State<AppState>) -> Response {
    let oauth_state = new_state();
    let location = state.identity.authorize_url(&oauth_state);
    let set_cookie = cookie::oauth_state_cookie(state.config.session.cookie_secure).build(&oauth_state);
    ([(header::SET_COOKIE, set_cookie)], Redirect::to(&location)).into_response()
}

#[instrument(skip(state, headers, query))]
pub async fn google_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OAuthCallbackQuery>,
) -> Response {
    let clear_state =
        cookie::oauth_state_cookie(state.config.session.cookie_secure).build_delete();
    let fail = |location: &'static str| {
        (
            AppendHeaders([(header::SET_COOKIE, clear_state.clone())]),
            Redirect::to(location),
        )
            .into_response()
    };

    if let Some(err) = query.error.as_deref() {
        warn!(error = %err, "provider returned an error");
        return fail(OAUTH_ERROR_REDIRECT);
    }
    let expected = extract_cookie(&headers, OAUTH_STATE_COOKIE);
    let (Some(code), Some(returned)) = (query.code.as_deref(), query.state.as_deref()) else {
        warn!("oauth callback missing code or state");
        return fail(OAUTH_ERROR_REDIRECT);
    };
    if expected.as_deref() != Some(returned) {
        warn!("oauth state mismatch");
        return fail(OAUTH_ERROR_REDIRECT);
    }

    let identity = match state.identity.exchange(code).await {
        Ok(identity) => identity,
        Err(e) => {
            error!(error = %e, provider = state.identity.id(), "oauth exchange failed");
            return fail(OAUTH_ERROR_REDIRECT);
        }
    };

    let user = match services::sign_in_oauth(
        state.users.as_ref(),
        identity,
        state.config.oauth.auto_provision,
    )
    .await
    {
        Ok(user) => user,
        Err(AuthError::ProvisioningDisabled) => return fail(OAUTH_DENIED_REDIRECT),
        Err(e) => {
            error!(error = %e, "error during google sign in");
            return fail(OAUTH_ERROR_REDIRECT);
        }
    };

    let token = match services::issue_session(&state.keys, &user) {
        Ok((token, _)) => token,
        Err(e) => {
            error!(error = %e, "issue session failed");
            return fail(OAUTH_ERROR_REDIRECT);
        }
    };

    (
        AppendHeaders([
            (header::SET_COOKIE, clear_state.clone()),
            (header::SET_COOKIE, session_cookie_header(&state, &token)),
        ]),
        Redirect::to(&state.guard.landing_path),
    )
        .into_response()
}

/// Anonymous callers get an empty object, not an error.
pub async fn get_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let session = cookie::session_token(&headers)
        .and_then(|token| services::read_session(&state.keys, &token));
    match session {
        Some(session) => Json(session).into_response(),
        None => Json(json!({})).into_response(),
    }
}

pub async fn providers() -> Response {
    Json(&PROVIDERS).into_response()
}

pub async fn sign_out(State(state): State<AppState>) -> Response {
    let clear = cookie::session_cookie(state.config.session.cookie_secure, 0).build_delete();
    (
        [(header::SET_COOKIE, clear)],
        Json(MessageResponse {
            message: "Signed out".into(),
        }),
    )
        .into_response()
}
