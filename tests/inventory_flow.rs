mod common;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::{
    Mock, ResponseTemplate,
    matchers::{body_partial_json, method, path, query_param},
};

use common::{
    TestApp, body_text, empty_movements, empty_opnames, location, movement, product, stock, warehouse,
};

// Tudo o que a página /inventory lê da API.
async fn mount_inventory_reads(app: &TestApp, stock_reads: u64) {
    Mock::given(method("GET"))
        .and(path("/warehouses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([warehouse("w1", "Gudang Utama"), warehouse("w2", "Gudang Timur")])))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([product("p1", "Kopi", 15000)])))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/inventory/warehouse/w1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([stock("i1", "p1", "w1", 10)])))
        .expect(stock_reads)
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/inventory/movements"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_movements()))
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/inventory/opnames"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_opnames()))
        .mount(&app.api)
        .await;
}

#[tokio::test]
async fn transfer_between_the_same_warehouse_is_never_sent() {
    let mut app = TestApp::spawn().await;
    app.login("tok").await;

    Mock::given(method("POST"))
        .and(path("/inventory/movements"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.api)
        .await;

    let same = app
        .post_form(
            "/inventory/transfers",
            "product_id=p1&from_warehouse_id=w1&to_warehouse_id=w1&quantity=2",
        )
        .await;
    assert_eq!(same.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&same), "/inventory?warehouse=w1");

    let missing = app
        .post_form(
            "/inventory/transfers",
            "product_id=p1&from_warehouse_id=w1&to_warehouse_id=&quantity=2",
        )
        .await;
    assert_eq!(missing.status(), StatusCode::SEE_OTHER);

    let zero = app
        .post_form(
            "/inventory/transfers",
            "product_id=p1&from_warehouse_id=w1&to_warehouse_id=w2&quantity=0",
        )
        .await;
    assert_eq!(zero.status(), StatusCode::SEE_OTHER);

    app.api.verify().await;
}

#[tokio::test]
async fn recorded_movement_refreshes_stock_on_the_next_visit() {
    let mut app = TestApp::spawn().await;
    app.login("tok").await;
    mount_inventory_reads(&app, 2).await;

    Mock::given(method("POST"))
        .and(path("/inventory/movements"))
        .and(body_partial_json(json!({
            "productId": "p1",
            "type": "IN",
            "toWarehouseId": "w1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(movement("m1", "p1", "w1", 5)))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app.get("/inventory?warehouse=w1").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Kopi"));

    let response = app
        .post_form(
            "/inventory/movements",
            "product_id=p1&movement_type=IN&quantity=5&warehouse_id=w1",
        )
        .await;
    assert_eq!(location(&response), "/inventory?warehouse=w1");

    let page = body_text(app.get("/inventory?warehouse=w1").await).await;
    assert!(page.contains("Movimentação registrada."));

    // Estoque lido de novo; armazéns e produtos continuam no cache.
    app.api.verify().await;
}

#[tokio::test]
async fn opname_draft_is_counted_and_submitted() {
    let mut app = TestApp::spawn().await;
    app.login("tok").await;
    mount_inventory_reads(&app, 2).await;

    Mock::given(method("POST"))
        .and(path("/inventory/opnames"))
        .and(body_partial_json(json!({
            "warehouseId": "w1",
            "items": [{ "productId": "p1", "actualQuantity": 8.0 }]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "op1",
            "warehouseId": "w1",
            "status": "DRAFT",
            "items": [{ "productId": "p1", "systemQuantity": 10, "actualQuantity": 8 }]
        })))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app
        .post_form("/inventory/opname/items", "warehouse_id=w1&product_id=p1")
        .await;
    assert_eq!(location(&response), "/inventory?warehouse=w1");

    let response = app
        .post_form("/inventory/opname/items/p1", "physical_quantity=8&notes=")
        .await;
    assert_eq!(location(&response), "/inventory?warehouse=w1");

    // O rascunho aparece com a divergência (8 - 10).
    let page = body_text(app.get("/inventory").await).await;
    assert!(page.contains("<span>-2</span>"));

    let response = app.post_form("/inventory/opname", "notes=").await;
    assert_eq!(location(&response), "/inventory?warehouse=w1");

    let page = body_text(app.get("/inventory?warehouse=w1").await).await;
    assert!(page.contains("Contagem enviada."));

    app.api.verify().await;
}

#[tokio::test]
async fn opname_needs_a_warehouse_first() {
    let mut app = TestApp::spawn().await;
    app.login("tok").await;

    Mock::given(method("POST"))
        .and(path("/inventory/opnames"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.api)
        .await;

    let response = app.post_form("/inventory/opname/items", "product_id=p1").await;
    assert_eq!(location(&response), "/inventory");

    let response = app.post_form("/inventory/opname", "notes=").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    app.api.verify().await;
}

#[tokio::test]
async fn stock_lines_are_written_corrected_and_removed() {
    let mut app = TestApp::spawn().await;
    app.login("tok").await;

    Mock::given(method("POST"))
        .and(path("/inventory"))
        .and(body_partial_json(json!({
            "productId": "p1",
            "warehouseId": "w1",
            "quantity": 12.0,
            "reorderLevel": 3.0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(stock("i1", "p1", "w1", 12)))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/inventory/i1/quantity"))
        .and(body_partial_json(json!({ "quantity": 7.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(stock("i1", "p1", "w1", 7)))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/inventory/i1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app
        .post_form(
            "/inventory/items",
            "warehouse_id=w1&product_id=p1&quantity=12&reorder_level=3",
        )
        .await;
    assert_eq!(location(&response), "/inventory?warehouse=w1");

    // Quantidade negativa nem chega na API.
    let response = app
        .post_form("/inventory/items/i1/quantity", "warehouse_id=w1&quantity=-1")
        .await;
    assert_eq!(location(&response), "/inventory?warehouse=w1");

    let response = app
        .post_form("/inventory/items/i1/quantity", "warehouse_id=w1&quantity=7")
        .await;
    assert_eq!(location(&response), "/inventory?warehouse=w1");

    let response = app.post_form("/inventory/items/i1/delete", "warehouse_id=w1").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    app.api.verify().await;
}

#[tokio::test]
async fn completing_an_opname_posts_the_adjustments() {
    let mut app = TestApp::spawn().await;
    app.login("tok").await;

    let completed = json!({
        "id": "op1",
        "warehouseId": "w1",
        "status": "COMPLETED",
        "items": [
            { "productId": "p1", "systemQuantity": 10, "actualQuantity": 8 },
            { "productId": "p2", "systemQuantity": 3, "actualQuantity": 3 }
        ]
    });

    // A lista nunca é consultada: o PATCH vai direto.
    Mock::given(method("GET"))
        .and(path("/inventory/opnames"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty_opnames()))
        .expect(0)
        .mount(&app.api)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/inventory/opnames/op1/status"))
        .and(body_partial_json(json!({ "status": "COMPLETED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completed))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/inventory/opnames/op1/status"))
        .and(body_partial_json(json!({ "status": "IN_PROGRESS" })))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "Transição inválida" })),
        )
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("POST"))
        .and(path("/inventory/movements"))
        .and(body_partial_json(json!({
            "productId": "p1",
            "type": "ADJUSTMENT",
            "quantity": 2.0,
            "fromWarehouseId": "w1",
            "reference": "OPNAME-op1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(movement("m9", "p1", "w1", 2)))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app
        .post_form("/inventory/opnames/op1/status", "status=COMPLETED")
        .await;
    assert_eq!(location(&response), "/inventory?warehouse=w1");

    // A API recusa a transição: nenhum ajuste é enviado.
    let response = app
        .post_form("/inventory/opnames/op1/status", "status=IN_PROGRESS")
        .await;
    assert_eq!(location(&response), "/inventory");

    app.api.verify().await;
}

#[tokio::test]
async fn failed_adjustment_does_not_stop_the_others() {
    let mut app = TestApp::spawn().await;
    app.login("tok").await;
    mount_inventory_reads(&app, 1).await;

    Mock::given(method("PATCH"))
        .and(path("/inventory/opnames/op1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "op1",
            "warehouseId": "w1",
            "status": "COMPLETED",
            "items": [
                { "productId": "p1", "systemQuantity": 10, "actualQuantity": 8 },
                { "productId": "p3", "systemQuantity": 0, "actualQuantity": 4 }
            ]
        })))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("POST"))
        .and(path("/inventory/movements"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "indisponível" })))
        .expect(2)
        .mount(&app.api)
        .await;

    let response = app
        .post_form("/inventory/opnames/op1/status", "status=COMPLETED")
        .await;
    assert_eq!(location(&response), "/inventory");

    let page = body_text(app.get("/inventory").await).await;
    assert!(page.contains("p1, p3"));

    app.api.verify().await;
}

#[tokio::test]
async fn opname_beyond_the_first_page_is_updated() {
    let mut app = TestApp::spawn().await;
    app.login("tok").await;

    // Só a op1 viria na primeira página.
    Mock::given(method("GET"))
        .and(path("/inventory/opnames"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "op1", "warehouseId": "w1", "status": "DRAFT", "items": [] }],
            "total": 2
        })))
        .expect(0)
        .mount(&app.api)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/inventory/opnames/op2/status"))
        .and(body_partial_json(json!({ "status": "CANCELLED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "op2",
            "warehouseId": "w2",
            "status": "CANCELLED",
            "items": [{ "productId": "p1", "systemQuantity": 10, "actualQuantity": 7 }]
        })))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("POST"))
        .and(path("/inventory/movements"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.api)
        .await;

    let response = app
        .post_form("/inventory/opnames/op2/status", "status=CANCELLED")
        .await;
    assert_eq!(location(&response), "/inventory?warehouse=w2");

    app.api.verify().await;
}

#[tokio::test]
async fn crafted_warehouse_id_is_encoded_in_the_redirect() {
    let mut app = TestApp::spawn().await;
    app.login("tok").await;

    Mock::given(method("DELETE"))
        .and(path("/inventory/i1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app
        .post_form("/inventory/items/i1/delete", "warehouse_id=w1%0D%0AX-Evil%3A+1")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/inventory?warehouse=w1%0D%0AX-Evil%3A+1");
    assert!(response.headers().get("x-evil").is_none());

    app.api.verify().await;
}

#[tokio::test]
async fn movement_history_matches_the_api_pagination() {
    let mut app = TestApp::spawn().await;
    app.login("tok").await;

    // A API devolve a página já filtrada; o painel mostra exatamente essas linhas.
    let mut adjusted = movement("m7", "p1", "w1", 4);
    adjusted["reference"] = json!("PO-77");
    Mock::given(method("GET"))
        .and(path("/inventory/movements"))
        .and(query_param("type", "OUT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [adjusted],
            "pagination": { "total": 11, "page": 1, "limit": 10, "totalPages": 2 }
        })))
        .expect(1)
        .mount(&app.api)
        .await;
    mount_inventory_reads(&app, 1).await;

    let page = body_text(app.get("/inventory?warehouse=w1&type=OUT").await).await;
    assert!(page.contains("PO-77"));
    assert!(page.contains("Page 1 of 2"));
    assert!(!page.contains("No movements match the filter."));

    app.api.verify().await;
}
