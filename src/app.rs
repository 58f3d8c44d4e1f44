use std::net::SocketAddr;

use axum::{middleware, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::guard::route_guard;
use crate::state::AppState;
use crate::{auth, cadastros, health, pages};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(cadastros::router())
        .merge(health::health_routes())
        .merge(pages::page_routes())
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "cadastro_aco=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "8080".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, req: Request<Body>) -> Response {
        app.clone().oneshot(req).await.unwrap()
    }

    fn json_req(method: Method, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
        let mut b = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(c) = cookie {
            b = b.header(header::COOKIE, c);
        }
        b.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut b = Request::builder().uri(uri);
        if let Some(c) = cookie {
            b = b.header(header::COOKIE, c);
        }
        b.body(Body::empty()).unwrap()
    }

    async fn body(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }

    fn session_cookie(res: &Response) -> String {
        let set = res.headers()[header::SET_COOKIE].to_str().unwrap();
        set.split(';').next().unwrap().to_string()
    }

    async fn register_and_login(app: &Router, nome: &str, email: &str) -> String {
        let res = send(
            app,
            json_req(
                Method::POST,
                "/api/auth/register",
                None,
                json!({"nome": nome, "email": email, "senha": "secret123"}),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let res = send(
            app,
            json_req(
                Method::POST,
                "/api/auth/login",
                None,
                json!({"email": email, "senha": "secret123"}),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        session_cookie(&res)
    }

    fn cadastro_body(nome: &str) -> Value {
        json!({
            "nome": nome,
            "composicao": "Aço Inoxidável",
            "formato": "Chapa Grossa",
            "normaTecnica": "ASTM A36",
            "acabamento": "Polido"
        })
    }

    fn assert_no_store(res: &Response) {
        let h = res.headers();
        assert_eq!(h[header::CACHE_CONTROL], "no-store, no-cache, must-revalidate, max-age=0");
        assert_eq!(h[header::PRAGMA], "no-cache");
        assert_eq!(h[header::EXPIRES], "0");
    }

    #[tokio::test]
    async fn full_cadastro_lifecycle() {
        let app = build_app(AppState::fake());

        let res = send(
            &app,
            json_req(
                Method::POST,
                "/api/auth/register",
                None,
                json!({"nome": "Ana", "email": "a@x.com", "senha": "secret123"}),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let registered = body(res).await;
        assert_eq!(registered["usuario"]["email"], "a@x.com");
        assert!(registered["usuario"].get("senha").is_none());

        let res = send(
            &app,
            json_req(
                Method::POST,
                "/api/auth/login",
                None,
                json!({"email": "a@x.com", "senha": "secret123"}),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let set_cookie = res.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(set_cookie.contains("HttpOnly"));
        let cookie = session_cookie(&res);

        let res = send(
            &app,
            json_req(Method::POST, "/api/cadastros", Some(&cookie), cadastro_body("Chapa A")),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created = body(res).await;
        let id = created["cadastro"]["id"].as_str().unwrap().to_string();
        assert_eq!(created["cadastro"]["nomeCadastro"], "Chapa A");

        let res = send(&app, get("/api/cadastros", Some(&cookie))).await;
        assert_eq!(res.status(), StatusCode::OK);
        let listed = body(res).await;
        let items = listed["cadastros"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], id.as_str());
        assert_eq!(items[0]["composicao"]["nome"], "Aço Inoxidável");

        let uri = format!("/api/cadastros/{id}");
        let res = send(&app, json_req(Method::DELETE, &uri, Some(&cookie), json!({}))).await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = send(&app, json_req(Method::DELETE, &uri, Some(&cookie), json!({}))).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(res).await["error"], "Cadastro não encontrado ou não autorizado");
    }

    #[tokio::test]
    async fn registering_twice_is_a_conflict() {
        let app = build_app(AppState::fake());
        let req = || {
            json_req(
                Method::POST,
                "/api/auth/register",
                None,
                json!({"nome": "Ana", "email": "a@x.com", "senha": "secret123"}),
            )
        };
        assert_eq!(send(&app, req()).await.status(), StatusCode::CREATED);
        let res = send(&app, req()).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(res).await["error"], "Email já cadastrado");
    }

    #[tokio::test]
    async fn register_requires_all_fields() {
        let app = build_app(AppState::fake());
        let res = send(
            &app,
            json_req(Method::POST, "/api/auth/register", None, json!({"email": "a@x.com"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body(res).await["error"].is_string());
    }

    #[tokio::test]
    async fn wrong_password_is_401() {
        let app = build_app(AppState::fake());
        register_and_login(&app, "Ana", "a@x.com").await;
        let res = send(
            &app,
            json_req(
                Method::POST,
                "/api/auth/login",
                None,
                json!({"email": "a@x.com", "senha": "wrong"}),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().get(header::SET_COOKIE).is_none());
    }

    #[tokio::test]
    async fn foreign_delete_looks_like_missing() {
        let app = build_app(AppState::fake());
        let ana = register_and_login(&app, "Ana", "a@x.com").await;
        let bia = register_and_login(&app, "Bia", "b@x.com").await;

        let res = send(
            &app,
            json_req(Method::POST, "/api/cadastros", Some(&ana), cadastro_body("Chapa A")),
        )
        .await;
        let id = body(res).await["cadastro"]["id"].as_str().unwrap().to_string();

        let foreign = send(
            &app,
            json_req(Method::DELETE, &format!("/api/cadastros/{id}"), Some(&bia), json!({})),
        )
        .await;
        let missing = send(
            &app,
            json_req(
                Method::DELETE,
                &format!("/api/cadastros/{}", uuid::Uuid::new_v4()),
                Some(&bia),
                json!({}),
            ),
        )
        .await;
        assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(foreign).await, body(missing).await);

        let res = send(&app, get("/api/cadastros", Some(&bia))).await;
        assert!(body(res).await["cadastros"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_statistics() {
        let app = build_app(AppState::fake());
        let ana = register_and_login(&app, "Ana", "a@x.com").await;
        let res = send(
            &app,
            json_req(Method::POST, "/api/cadastros", Some(&ana), cadastro_body("Chapa A")),
        )
        .await;
        let id = body(res).await["cadastro"]["id"].as_str().unwrap().to_string();
        send(
            &app,
            json_req(Method::POST, "/api/cadastros", Some(&ana), cadastro_body("Chapa B")),
        )
        .await;

        let mut changed = cadastro_body("Chapa A2");
        changed["composicao"] = json!("Aço Ferramenta");
        let res = send(
            &app,
            json_req(Method::PUT, &format!("/api/cadastros/{id}"), Some(&ana), changed),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(res).await["cadastro"]["nomeCadastro"], "Chapa A2");

        let res = send(&app, get("/api/cadastros/estatisticas", Some(&ana))).await;
        assert_eq!(res.status(), StatusCode::OK);
        let stats = body(res).await;
        assert_eq!(stats["total"], 2);
        assert_eq!(stats["composicao"]["Aço Ferramenta"], 1);
        assert_eq!(stats["composicao"]["Aço Inoxidável"], 1);
        assert_eq!(stats["normaTecnica"]["ASTM A36"], 2);
    }

    #[tokio::test]
    async fn api_without_session_is_401_json() {
        let app = build_app(AppState::fake());
        for req in [
            get("/api/cadastros", None),
            get("/api/cadastros/estatisticas", Some("cadastro_session=forged")),
            json_req(Method::POST, "/api/cadastros", None, cadastro_body("x")),
        ] {
            let res = send(&app, req).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body(res).await["error"], "Não autenticado");
        }
    }

    #[tokio::test]
    async fn guard_redirects_anonymous_page_requests() {
        let app = build_app(AppState::fake());
        for path in ["/dashboard", "/grafico", "/"] {
            let res = send(&app, get(path, None)).await;
            assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
            assert_eq!(res.headers()[header::LOCATION], "/login");
            assert_no_store(&res);
        }
    }

    #[tokio::test]
    async fn guard_fails_closed_on_bad_token() {
        let app = build_app(AppState::fake());
        let res = send(&app, get("/dashboard", Some("cadastro_session=not.a.jwt"))).await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn guard_allows_public_pages() {
        let app = build_app(AppState::fake());
        for path in ["/login", "/register"] {
            let res = send(&app, get(path, None)).await;
            assert_eq!(res.status(), StatusCode::OK);
        }
        let res = send(&app, get("/api/auth/session", Some("cadastro_session=junk"))).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body(res).await, Value::Null);
    }

    #[tokio::test]
    async fn signed_in_user_bounces_off_auth_pages() {
        let app = build_app(AppState::fake());
        let cookie = register_and_login(&app, "Ana", "a@x.com").await;
        for path in ["/login", "/register"] {
            let res = send(&app, get(path, Some(&cookie))).await;
            assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
            assert_eq!(res.headers()[header::LOCATION], "/dashboard");
        }
    }

    #[tokio::test]
    async fn api_prefixed_paths_are_never_redirected() {
        let app = build_app(AppState::fake());
        let res = send(&app, get("/api-docs", None)).await;
        assert_ne!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert!(res.headers().get(header::LOCATION).is_none());
    }

    #[tokio::test]
    async fn trailing_slash_auth_page_counts_as_auth_page() {
        let app = build_app(AppState::fake());
        let res = send(&app, get("/login/", None)).await;
        assert_eq!(res.status(), StatusCode::OK);

        let cookie = register_and_login(&app, "Ana", "a@x.com").await;
        let res = send(&app, get("/login/", Some(&cookie))).await;
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.headers()[header::LOCATION], "/dashboard");
    }

    #[tokio::test]
    async fn protected_pages_for_signed_in_user_are_not_cached() {
        let app = build_app(AppState::fake());
        let cookie = register_and_login(&app, "Ana", "a@x.com").await;
        let res = send(&app, get("/dashboard", Some(&cookie))).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_no_store(&res);
    }

    #[tokio::test]
    async fn session_endpoint_and_logout() {
        let app = build_app(AppState::fake());
        let cookie = register_and_login(&app, "Ana", "a@x.com").await;

        let res = send(&app, get("/api/auth/session", Some(&cookie))).await;
        assert_eq!(body(res).await["usuario"]["nome"], "Ana");

        let res = send(&app, json_req(Method::POST, "/api/auth/logout", Some(&cookie), json!({}))).await;
        assert_eq!(res.status(), StatusCode::OK);
        let cleared = res.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cleared.starts_with("cadastro_session=;"));
        assert!(cleared.contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = build_app(AppState::fake());
        let cookie = register_and_login(&app, "Ana", "a@x.com").await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/api/cadastros")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, &cookie)
            .body(Body::from("{not json"))
            .unwrap();
        let res = send(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(body(res).await["error"].is_string());
    }

    #[tokio::test]
    async fn health_reports_masked_url() {
        let app = build_app(AppState::fake());
        let res = send(&app, get("/api/health/db", None)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let report = body(res).await;
        assert_eq!(report["status"], "healthy");
        assert_eq!(report["database"]["url"], "configured");
        assert_eq!(report["database"]["urlMasked"], "postgres://localhost:5432/cadastro?***");
    }
}
