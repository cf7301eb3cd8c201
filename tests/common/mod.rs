// tests/common/mod.rs
#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use inventory_panel::{
    config::{AppState, Settings},
    routes::build_router,
};

// O painel de verdade, falando com uma API falsa (wiremock).
// Guarda o cookie de sessão como um navegador faria.
pub struct TestApp {
    pub api: MockServer,
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let api = MockServer::start().await;
        let settings = Settings {
            api_base_url: api.uri(),
            ..Settings::default()
        };
        let state = AppState::new(settings).expect("estado do painel");
        Self {
            api,
            router: build_router(state),
            cookie: None,
        }
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        let request = Request::builder().method("GET").uri(uri);
        self.send(request, Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(form.to_string())).await
    }

    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        if let Some(value) = response.headers().get(header::SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    /// O par `nome=valor` do cookie de sessão que o "navegador" tem agora.
    pub fn session_cookie(&self) -> Option<String> {
        self.cookie.clone()
    }

    pub fn use_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    /// Faz login com o token informado (opaco, sem `exp`).
    pub async fn login(&mut self, token: &str) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": token,
                "refreshToken": "refresh-1",
                "user": user()
            })))
            .mount(&self.api)
            .await;

        let response = self
            .post_form("/login", "email=ana%40example.com&password=segredo1")
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard");
    }
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// ---
// Dados da API falsa
// ---
pub fn user() -> Value {
    json!({ "id": "u1", "name": "Ana", "email": "ana@example.com" })
}

pub fn product(id: &str, name: &str, price: u64) -> Value {
    json!({ "id": id, "name": name, "sku": format!("SKU-{}", id), "price": price })
}

pub fn warehouse(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "location": "Jakarta", "capacity": 100 })
}

pub fn stock(id: &str, product_id: &str, warehouse_id: &str, quantity: u64) -> Value {
    json!({
        "id": id,
        "productId": product_id,
        "warehouseId": warehouse_id,
        "quantity": quantity,
        "reorderLevel": 5
    })
}

pub fn movement(id: &str, product_id: &str, to: &str, quantity: u64) -> Value {
    json!({
        "id": id,
        "productId": product_id,
        "type": "IN",
        "quantity": quantity,
        "toWarehouseId": to,
        "createdAt": "2025-12-16T10:30:00Z"
    })
}

pub fn empty_movements() -> Value {
    json!({
        "data": [],
        "pagination": { "total": 0, "page": 1, "limit": 10, "totalPages": 0 }
    })
}

pub fn empty_opnames() -> Value {
    json!({ "data": { "data": [], "total": 0 } })
}
