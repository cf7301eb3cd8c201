mod common;

use axum::http::{StatusCode, header::SET_COOKIE};
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

use common::{TestApp, body_text, location, product};

#[tokio::test]
async fn panel_routes_redirect_to_login_without_a_session() {
    let mut app = TestApp::spawn().await;

    for uri in ["/dashboard", "/products", "/warehouse", "/inventory"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&response), "/login");
    }

    let response = app.get("/").await;
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn expired_token_is_refreshed_once_and_the_request_retried() {
    let mut app = TestApp::spawn().await;
    app.login("old").await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "new" })))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(header("authorization", "Bearer new"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [product("p1", "Kopi Luwak", 15000)] })),
        )
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app.get("/products").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Kopi Luwak"));

    app.api.verify().await;
}

#[tokio::test]
async fn failed_refresh_ends_the_session() {
    let mut app = TestApp::spawn().await;
    app.login("old").await;

    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh-token"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app.get("/products").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    // Os tokens foram apagados: o guard nem chama a API.
    let response = app.get("/dashboard").await;
    assert_eq!(location(&response), "/login");

    app.api.verify().await;
}

#[tokio::test]
async fn logout_clears_the_session() {
    let mut app = TestApp::spawn().await;
    app.login("tok").await;

    let response = app.post_form("/logout", "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    let response = app.get("/products").await;
    assert_eq!(location(&response), "/login");

    let page = body_text(app.get("/login").await).await;
    assert!(page.contains("Você saiu do painel."));
}

#[tokio::test]
async fn invalid_credentials_rerender_the_form() {
    let mut app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "Unauthorized" })))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app
        .post_form("/login", "email=ana%40example.com&password=errada1")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("E-mail ou senha inválidos."));
    assert!(page.contains("ana@example.com"));

    app.api.verify().await;
}

#[tokio::test]
async fn malformed_login_never_reaches_the_api() {
    let mut app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.api)
        .await;

    let response = app.post_form("/login", "email=nao-e-email&password=123").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("O e-mail fornecido é inválido."));

    app.api.verify().await;
}

#[tokio::test]
async fn login_issues_a_new_session_id() {
    let mut app = TestApp::spawn().await;

    // Uma notificação pendente faz a sessão anônima ganhar cookie.
    app.post_form("/logout", "").await;
    let before = app.session_cookie().expect("cookie da sessão anônima");

    app.login("tok").await;
    let after = app.session_cookie().expect("cookie depois do login");
    assert_ne!(before, after);

    // O cookie de antes do login não leva mais a lugar nenhum.
    app.use_cookie(Some(before));
    let response = app.get("/products").await;
    assert_eq!(location(&response), "/login");

    app.use_cookie(Some(after));
    let response = app.get("/login").await;
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn anonymous_requests_do_not_create_sessions() {
    let mut app = TestApp::spawn().await;

    for uri in ["/health", "/login", "/register", "/nao-existe", "/dashboard"] {
        let response = app.get(uri).await;
        assert!(response.headers().get(SET_COOKIE).is_none(), "{}", uri);
    }
    assert!(app.session_cookie().is_none());

    // Só o que sobra para a próxima página (o toast do logout) é guardado.
    let response = app.post_form("/logout", "").await;
    assert!(response.headers().get(SET_COOKIE).is_some());
    let page = body_text(app.get("/login").await).await;
    assert!(page.contains("Você saiu do painel."));
}
