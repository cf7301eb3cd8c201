// src/handlers/inventory.rs

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;

use crate::{
    common::{
        error::AppError,
        format::format_quantity,
        pagination::{Page, filter_by_text},
        validation::{field_error, non_empty, parse_decimal, parse_optional_decimal},
    },
    config::AppState,
    handlers::flash_outcome,
    middleware::auth::AuthenticatedUser,
    models::{
        inventory::{InventoryItem, InventoryItemPayload, MovementQuery, NewStockMovement, StockMovementType},
        opname::{OpnameQuery, StockOpnameStatus},
    },
    services::ledger::on_hand,
    session::Session,
    views::{
        Chrome, DraftRow, InventoryTemplate, MovementFilters, MovementRow, OpnameRow, OptionView, Pager,
        StockRow, movement_type_options, render,
    },
};

// ---
// Parâmetros da página
// ---
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InventoryParams {
    pub warehouse: String,
    pub q: String,
    pub page: Option<usize>,
    #[serde(rename = "type")]
    pub movement_type: String,
    pub start_date: String,
    pub end_date: String,
    pub mpage: Option<u32>,
}

impl InventoryParams {
    // Filtros inválidos são ignorados (a página abre sem eles).
    fn movement_query(&self, warehouse_id: &str, limit: u32) -> MovementQuery {
        MovementQuery {
            warehouse_id: non_empty(warehouse_id),
            movement_type: non_empty(&self.movement_type).and_then(|t| t.parse().ok()),
            start_date: non_empty(&self.start_date).and_then(|d| d.parse::<NaiveDate>().ok()),
            end_date: non_empty(&self.end_date).and_then(|d| d.parse::<NaiveDate>().ok()),
            page: Some(self.mpage.unwrap_or(1).max(1)),
            limit: Some(limit),
        }
    }
}

// O id vem do formulário: vai codificado para a query string do redirect.
fn inventory_url(warehouse_id: &str) -> String {
    if warehouse_id.is_empty() {
        return "/inventory".to_string();
    }
    match serde_urlencoded::to_string(&[("warehouse", warehouse_id)]) {
        Ok(query) => format!("/inventory?{}", query),
        Err(_) => "/inventory".to_string(),
    }
}

// O armazém que o usuário está olhando: o da URL, o da contagem em
// andamento ou, na falta dos dois, o primeiro da lista.
fn selected_warehouse(session: &Session, requested: &str, first: Option<&str>) -> String {
    non_empty(requested)
        .or_else(|| session.with_draft(|draft| draft.warehouse_id.clone()))
        .or_else(|| first.map(str::to_string))
        .unwrap_or_default()
}

pub async fn inventory_page(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, user }: AuthenticatedUser,
    Query(params): Query<InventoryParams>,
) -> Result<Html<String>, AppError> {
    let warehouses = app_state.location_service.list(&session).await?;
    let products = app_state.catalog_service.list(&session).await?;
    let warehouse_id = selected_warehouse(
        &session,
        &params.warehouse,
        warehouses.first().map(|w| w.id.as_str()),
    );

    let product_names: HashMap<&str, (&str, &str)> = products
        .iter()
        .map(|p| (p.id.as_str(), (p.name.as_str(), p.sku.as_str())))
        .collect();
    let warehouse_names: HashMap<&str, &str> =
        warehouses.iter().map(|w| (w.id.as_str(), w.name.as_str())).collect();
    let product_name = |id: &str| {
        product_names
            .get(id)
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|| id.to_string())
    };
    let warehouse_name = |id: &str| {
        warehouse_names
            .get(id)
            .map(|name| name.to_string())
            .unwrap_or_else(|| id.to_string())
    };

    // --- 1. Estoque do armazém ---
    let stock = app_state
        .inventory_service
        .warehouse_inventory(&session, &warehouse_id)
        .await?;
    let labelled: Vec<(String, String, InventoryItem)> = stock
        .into_iter()
        .map(|item| {
            let (name, sku) = match &item.product {
                Some(p) => (p.name.clone(), p.sku.clone()),
                None => product_names
                    .get(item.product_id.as_str())
                    .map(|(n, s)| (n.to_string(), s.to_string()))
                    .unwrap_or_else(|| (item.product_id.clone(), String::new())),
            };
            (name, sku, item)
        })
        .collect();
    let filtered = filter_by_text(labelled, &params.q, |(name, sku, _)| vec![name.as_str(), sku.as_str()]);
    let stock_page = Page::paginate(filtered, params.page.unwrap_or(1), app_state.settings.page_size);
    let stock_pager = Pager::from(&stock_page);
    let stock_rows = stock_page
        .items
        .into_iter()
        .map(|(product, sku, item)| StockRow::new(&item, product, sku))
        .collect();

    // --- 2. Histórico de movimentações ---
    let limit = u32::try_from(app_state.settings.page_size).unwrap_or(u32::MAX);
    let query = params.movement_query(&warehouse_id, limit);
    let history = app_state.inventory_service.stock_movements(&session, &query).await?;
    let net_change = if warehouse_id.is_empty() {
        "-".to_string()
    } else {
        format_quantity(on_hand(&history.data).warehouse_total(&warehouse_id))
    };
    let movements = history
        .data
        .iter()
        .map(|m| MovementRow::new(m, product_name, warehouse_name))
        .collect();

    // --- 3. Contagens ---
    let opnames = if warehouse_id.is_empty() {
        Vec::new()
    } else {
        let opname_query = OpnameQuery {
            warehouse_id: Some(warehouse_id.clone()),
            ..Default::default()
        };
        app_state.opname_service.list(&session, &opname_query).await?.data
    };
    let opname_rows = opnames
        .iter()
        .map(|op| OpnameRow {
            id: op.id.clone(),
            warehouse: warehouse_name(&op.warehouse_id),
            status: op.status.to_string(),
            created_at: op
                .created_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            item_count: op.items.len(),
            notes: op.notes.clone().unwrap_or_default(),
            actions: OpnameRow::actions_for(op.status),
        })
        .collect();

    let draft = app_state.opname_service.draft(&session);
    let draft_rows = draft
        .lines
        .iter()
        .map(|line| DraftRow {
            product_id: line.product_id.clone(),
            product: product_name(&line.product_id),
            system_quantity: format_quantity(line.system_quantity),
            physical_quantity: format_quantity(line.physical_quantity),
            discrepancy: format_quantity(line.discrepancy()),
            notes: line.notes.clone().unwrap_or_default(),
        })
        .collect();

    let page = InventoryTemplate {
        chrome: Chrome::new(&session, "inventory", user.display_name()),
        warehouse_options: warehouses
            .iter()
            .map(|w| OptionView::new(w.id.clone(), w.name.clone(), w.id == warehouse_id))
            .collect(),
        product_options: products
            .iter()
            .map(|p| OptionView::new(p.id.clone(), format!("{} ({})", p.name, p.sku), false))
            .collect(),
        search: params.q.clone(),
        stock: stock_rows,
        stock_pager,
        filters: MovementFilters {
            movement_types: movement_type_options(query.movement_type),
            start_date: query.start_date.map(|d| d.to_string()).unwrap_or_default(),
            end_date: query.end_date.map(|d| d.to_string()).unwrap_or_default(),
        },
        movements,
        movement_page: history.pagination.page.max(1),
        movement_total_pages: history.pagination.total_pages.max(1),
        movement_has_previous: history.pagination.has_previous(),
        movement_has_next: history.pagination.has_next(),
        movement_previous_page: history.pagination.page.saturating_sub(1).max(1),
        movement_next_page: history.pagination.page.saturating_add(1),
        net_change,
        draft_warehouse: draft.warehouse_id.clone().unwrap_or_else(|| warehouse_id.clone()),
        draft: draft_rows,
        opnames: opname_rows,
        warehouse_id,
    };
    render(&page)
}

// ---
// Linhas de estoque (correção direta do saldo)
// ---
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StockItemForm {
    pub warehouse_id: String,
    pub product_id: String,
    pub quantity: String,
    pub reorder_level: String,
}

impl StockItemForm {
    fn into_payload(self) -> Result<InventoryItemPayload, AppError> {
        Ok(InventoryItemPayload {
            quantity: parse_decimal("quantity", &self.quantity)?,
            reorder_level: parse_optional_decimal("reorderLevel", &self.reorder_level)?,
            product_id: self.product_id.trim().to_string(),
            warehouse_id: self.warehouse_id.trim().to_string(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuantityForm {
    pub warehouse_id: String,
    pub quantity: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BackForm {
    pub warehouse_id: String,
}

pub async fn upsert_stock_item(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Form(form): Form<StockItemForm>,
) -> Result<Redirect, AppError> {
    let back = inventory_url(&form.warehouse_id);
    let result = async {
        let payload = form.into_payload()?;
        app_state.inventory_service.add_or_update_item(&session, payload).await
    }
    .await;
    flash_outcome(&session, result, "Estoque gravado.", &back)
}

pub async fn update_stock_quantity(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Path(id): Path<String>,
    Form(form): Form<QuantityForm>,
) -> Result<Redirect, AppError> {
    let back = inventory_url(&form.warehouse_id);
    let result = async {
        let quantity = parse_decimal("quantity", &form.quantity)?;
        app_state.inventory_service.update_quantity(&session, &id, quantity).await
    }
    .await;
    flash_outcome(&session, result, "Quantidade corrigida.", &back)
}

pub async fn delete_stock_item(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Path(id): Path<String>,
    Form(form): Form<BackForm>,
) -> Result<Redirect, AppError> {
    let result = app_state.inventory_service.delete_item(&session, &id).await;
    flash_outcome(&session, result, "Linha de estoque removida.", &inventory_url(&form.warehouse_id))
}

// ---
// Movimentações
// ---
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MovementForm {
    pub product_id: String,
    pub movement_type: String,
    pub quantity: String,
    pub warehouse_id: String,
    /// "increase" ou "decrease"; só vale para ajustes.
    pub direction: String,
    pub reference: String,
    pub notes: String,
}

impl MovementForm {
    fn into_movement(self) -> Result<NewStockMovement, AppError> {
        let movement_type: StockMovementType = self
            .movement_type
            .parse()
            .map_err(|message: String| field_error("type", "invalid", &message))?;
        let quantity = parse_decimal("quantity", &self.quantity)?;
        let warehouse = non_empty(&self.warehouse_id);
        let decrease = self.direction.eq_ignore_ascii_case("decrease");

        let (from_warehouse_id, to_warehouse_id) = match movement_type {
            StockMovementType::In => (None, warehouse),
            StockMovementType::Out | StockMovementType::Transfer => (warehouse, None),
            StockMovementType::Adjustment | StockMovementType::Opname if decrease => (warehouse, None),
            StockMovementType::Adjustment | StockMovementType::Opname => (None, warehouse),
        };

        Ok(NewStockMovement {
            product_id: self.product_id.trim().to_string(),
            movement_type,
            quantity,
            from_warehouse_id,
            to_warehouse_id,
            reference: non_empty(&self.reference),
            notes: non_empty(&self.notes),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransferForm {
    pub product_id: String,
    pub from_warehouse_id: String,
    pub to_warehouse_id: String,
    pub quantity: String,
    pub reference: String,
    pub notes: String,
}

impl TransferForm {
    fn into_movement(self) -> Result<NewStockMovement, AppError> {
        let quantity = parse_decimal("quantity", &self.quantity)?;
        let mut movement = NewStockMovement::transfer(
            self.product_id.trim(),
            quantity,
            self.from_warehouse_id.trim(),
            self.to_warehouse_id.trim(),
        );
        movement.reference = non_empty(&self.reference);
        movement.notes = non_empty(&self.notes);
        Ok(movement)
    }
}

pub async fn create_movement(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Form(form): Form<MovementForm>,
) -> Result<Redirect, AppError> {
    let back = inventory_url(&form.warehouse_id);
    let result = async {
        let movement = form.into_movement()?;
        app_state.inventory_service.create_stock_movement(&session, movement).await
    }
    .await;
    flash_outcome(&session, result, "Movimentação registrada.", &back)
}

pub async fn create_transfer(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Form(form): Form<TransferForm>,
) -> Result<Redirect, AppError> {
    let back = inventory_url(&form.from_warehouse_id);
    let result = async {
        let movement = form.into_movement()?;
        app_state.inventory_service.create_stock_movement(&session, movement).await
    }
    .await;
    flash_outcome(&session, result, "Transferência registrada.", &back)
}

// ---
// Contagem (opname)
// ---
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DraftItemForm {
    pub warehouse_id: String,
    pub product_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PhysicalCountForm {
    pub physical_quantity: String,
    pub notes: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SubmitOpnameForm {
    pub notes: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusForm {
    pub status: String,
}

fn draft_url(session: &Session) -> String {
    let warehouse_id = session
        .with_draft(|draft| draft.warehouse_id.clone())
        .unwrap_or_default();
    inventory_url(&warehouse_id)
}

pub async fn add_draft_item(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Form(form): Form<DraftItemForm>,
) -> Result<Redirect, AppError> {
    if let Some(warehouse_id) = non_empty(&form.warehouse_id) {
        app_state.opname_service.select_warehouse(&session, &warehouse_id);
    }
    let back = draft_url(&session);

    let result = app_state
        .opname_service
        .add_item(&session, form.product_id.trim())
        .await;
    // Produto repetido é ignorado sem aviso.
    if matches!(result, Ok(false)) {
        return Ok(Redirect::to(&back));
    }
    flash_outcome(&session, result, "Item adicionado à contagem.", &back)
}

pub async fn set_physical_count(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Path(product_id): Path<String>,
    Form(form): Form<PhysicalCountForm>,
) -> Result<Redirect, AppError> {
    let result = parse_decimal("physicalQuantity", &form.physical_quantity)
        .map_err(AppError::from)
        .and_then(|quantity| {
            app_state
                .opname_service
                .set_physical(&session, &product_id, quantity, non_empty(&form.notes))
        });
    flash_outcome(&session, result, "Contagem atualizada.", &draft_url(&session))
}

pub async fn remove_draft_item(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Path(product_id): Path<String>,
) -> Result<Redirect, AppError> {
    app_state.opname_service.remove_item(&session, &product_id);
    flash_outcome(&session, Ok(()), "Item removido da contagem.", &draft_url(&session))
}

pub async fn submit_opname(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Form(form): Form<SubmitOpnameForm>,
) -> Result<Redirect, AppError> {
    let back = draft_url(&session);
    let result = app_state
        .opname_service
        .submit(&session, non_empty(&form.notes))
        .await;
    flash_outcome(&session, result, "Contagem enviada.", &back)
}

pub async fn update_opname_status(
    State(app_state): State<AppState>,
    AuthenticatedUser { session, .. }: AuthenticatedUser,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    let result = async {
        let status: StockOpnameStatus = form
            .status
            .parse()
            .map_err(|message: String| field_error("status", "invalid", &message))?;
        app_state.opname_service.update_status(&session, &id, status).await
    }
    .await;

    let back = match &result {
        Ok(opname) => inventory_url(&opname.warehouse_id),
        Err(_) => "/inventory".to_string(),
    };
    flash_outcome(&session, result, "Status da contagem atualizado.", &back)
}
