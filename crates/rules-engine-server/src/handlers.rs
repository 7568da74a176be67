//! Route handlers.
//!
//! Bodies are taken as raw bytes so malformed JSON gets the same error body
//! every caller expects instead of axum's default rejection.

use crate::auth::is_authorized;
use crate::state::AppState;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::ALLOW;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use log::{debug, error, info, warn};
use rules_engine_protocol::{
    ErrorBody, FulfillmentResponse, IntentRequest, KeywordReply, KeywordRequest, LookupRequest,
    LookupResponse, PayloadError, parse_body,
};

pub(crate) async fn alive() -> &'static str {
    "Rules Engine: alive"
}

pub(crate) async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(ALLOW, "POST")],
        Json(ErrorBody::new("Method Not Allowed")),
    )
        .into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorBody::new(message))).into_response()
}

/// ManyChat external request: authenticate, adapt, resolve a keyword reply.
pub(crate) async fn manychat(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_authorized(&headers, state.auth_token.as_deref()) {
        warn!("rejected keyword webhook request (reason=unauthorized)");
        return error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let request = match parse_body(&body).and_then(|value| KeywordRequest::from_value(&value)) {
        Ok(request) => request,
        Err(PayloadError::InvalidJson(err)) => {
            debug!("invalid keyword webhook body (error={})", err);
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
        Err(PayloadError::MissingField(field)) => {
            debug!("keyword webhook body missing field (field={})", field);
            return error_response(StatusCode::BAD_REQUEST, "Missing contact_id");
        }
    };

    match state.keywords.resolve(&request.message).await {
        Ok(resolution) => {
            info!(
                "keyword reply sent (contact_id={}, default={})",
                request.contact_id, resolution.is_default
            );
            Json(KeywordReply::new(request, resolution.response_text)).into_response()
        }
        Err(err) => {
            error!(
                "keyword resolution failed (contact_id={}, error={})",
                request.contact_id, err
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Server error")
        }
    }
}

/// Dialogflow v2 fulfillment.
pub(crate) async fn dialogflow(State(state): State<AppState>, body: Bytes) -> Response {
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(err) => {
            debug!("invalid dialogflow body (error={})", err);
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };
    let request = IntentRequest::from_value(&value);
    let Some(intent_name) = request.intent_name.as_deref() else {
        debug!("dialogflow request without intent (session={})", request.session);
        return Json(FulfillmentResponse::text(state.replies.intent_fallback.as_str()))
            .into_response();
    };

    match state.intents.resolve(intent_name).await {
        Ok(Some(intent)) => {
            let text = if intent.response_text.trim().is_empty() {
                state.replies.intent_unconfigured.clone()
            } else {
                intent.response_text
            };
            debug!(
                "dialogflow intent matched (session={}, intent_id={})",
                request.session, intent.intent_id
            );
            Json(FulfillmentResponse::matched(text, intent.collect_fields)).into_response()
        }
        Ok(None) => {
            info!(
                "dialogflow intent not configured (session={}, intent={})",
                request.session, intent_name
            );
            Json(FulfillmentResponse::text(state.replies.intent_not_found.as_str()))
                .into_response()
        }
        Err(err) => {
            error!(
                "dialogflow resolution failed (session={}, error={})",
                request.session, err
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(FulfillmentResponse::text(state.replies.webhook_error.as_str())),
            )
                .into_response()
        }
    }
}

/// Direct lookup of one intent row by name or id.
pub(crate) async fn get_response(State(state): State<AppState>, body: Bytes) -> Response {
    let value = match parse_body(&body) {
        Ok(value) => value,
        Err(err) => {
            debug!("invalid lookup body (error={})", err);
            return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };
    let request: LookupRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(err) => {
            debug!("lookup body has no usable fields (error={})", err);
            LookupRequest::default()
        }
    };
    let Some(intent_name) = request.intent_name() else {
        return error_response(StatusCode::BAD_REQUEST, "intent_name requerido");
    };

    match state.intents.resolve(&intent_name).await {
        Ok(Some(intent)) => Json(LookupResponse::new(intent)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "Intent no encontrado"),
        Err(err) => {
            error!("intent lookup failed (intent={}, error={})", intent_name, err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error interno")
        }
    }
}
