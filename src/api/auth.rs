use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::AppState;

/// Bearer-token authentication middleware.
///
/// When the config carries an API token, every /api request must send
/// `Authorization: Bearer <token>` matching it. With no token configured
/// the check is disabled (dev mode).
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok());

    if token_accepted(state.config.api_token.as_deref(), header) {
        next.run(req).await
    } else {
        (StatusCode::UNAUTHORIZED, "Missing or invalid Authorization header").into_response()
    }
}

fn token_accepted(expected: Option<&str>, header: Option<&str>) -> bool {
    let Some(expected) = expected.filter(|t| !t.is_empty()) else {
        return true;
    };

    match header.and_then(|v| v.strip_prefix("Bearer ")) {
        Some(token) => token == expected,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_token_configured_allows_all() {
        assert!(token_accepted(None, None));
        assert!(token_accepted(None, Some("Bearer anything")));
        assert!(token_accepted(Some(""), None));
    }

    #[test]
    fn test_matching_bearer_token() {
        assert!(token_accepted(Some("sekret"), Some("Bearer sekret")));
    }

    #[test]
    fn test_rejects_wrong_or_malformed_header() {
        assert!(!token_accepted(Some("sekret"), None));
        assert!(!token_accepted(Some("sekret"), Some("Bearer wrong")));
        assert!(!token_accepted(Some("sekret"), Some("sekret")));
        assert!(!token_accepted(Some("sekret"), Some("Basic sekret")));
    }
}
