//! Permissive cross-origin filter applied to every route.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

fn apply(headers: &mut HeaderMap) {
    let cors: [(HeaderName, &'static str); 4] = [
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true"),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type, Content-Length, Authorization"),
        (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS, GET, PUT"),
    ];
    for (name, value) in cors {
        headers.insert(name, HeaderValue::from_static(value));
    }
}

/// Adds the CORS headers to every response; answers `OPTIONS` preflights with `204`.
pub async fn cors(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut res = StatusCode::NO_CONTENT.into_response();
        apply(res.headers_mut());
        return res;
    }

    let mut res = next.run(req).await;
    apply(res.headers_mut());
    res
}
