// src/views.rs

// As telas do painel. Os templates (askama) recebem tudo já formatado em
// texto; a lógica fica nos handlers e nos services.

use askama::Template;
use axum::response::Html;

use crate::{
    common::{
        error::AppError,
        format::format_quantity,
        pagination::Page,
    },
    models::{
        inventory::{InventoryItem, StockMovement, StockMovementType},
        opname::StockOpnameStatus,
    },
    session::{Flash, Session},
};

pub fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

// ---
// Moldura comum (menu, usuário, notificações)
// ---
pub struct FlashView {
    pub css: &'static str,
    pub message: String,
}

impl From<Flash> for FlashView {
    fn from(flash: Flash) -> Self {
        Self {
            css: flash.kind.css_class(),
            message: flash.message,
        }
    }
}

pub struct Chrome {
    pub current_page: &'static str,
    pub user_name: String,
    pub flashes: Vec<FlashView>,
}

impl Chrome {
    /// Consome as notificações pendentes da sessão.
    pub fn new(session: &Session, current_page: &'static str, user_name: &str) -> Self {
        Self {
            current_page,
            user_name: user_name.to_string(),
            flashes: session.take_flash().into_iter().map(FlashView::from).collect(),
        }
    }

    pub fn signed_in(&self) -> bool {
        !self.user_name.is_empty()
    }
}

pub struct Pager {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page: usize,
    pub next_page: usize,
}

impl<T> From<&Page<T>> for Pager {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            has_previous: page.can_previous(),
            has_next: page.can_next(),
            previous_page: page.previous_page(),
            next_page: page.next_page(),
        }
    }
}

/// Opção de um `<select>`.
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl OptionView {
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

pub fn movement_type_options(selected: Option<StockMovementType>) -> Vec<OptionView> {
    StockMovementType::ALL
        .into_iter()
        .map(|t| OptionView::new(t.as_str(), t.label(), selected == Some(t)))
        .collect()
}

// ---
// Login / registro
// ---
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub chrome: Chrome,
    pub email: String,
}

#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub chrome: Chrome,
    pub name: String,
    pub email: String,
}

// ---
// Dashboard
// ---
pub struct WarehouseStockRow {
    pub name: String,
    pub units: String,
    pub value: String,
    pub share: String,
    pub share_width: String,
}

pub struct LowStockRow {
    pub product: String,
    pub warehouse: String,
    pub quantity: String,
    pub reorder_level: String,
}

pub struct MovementRow {
    pub date: String,
    pub kind: String,
    pub kind_label: String,
    pub product: String,
    pub quantity: String,
    pub from: String,
    pub to: String,
    pub reference: String,
    pub notes: String,
}

impl MovementRow {
    pub fn new(
        movement: &StockMovement,
        product_name: impl Fn(&str) -> String,
        warehouse_name: impl Fn(&str) -> String,
    ) -> Self {
        Self {
            date: movement.created_at.format("%Y-%m-%d %H:%M").to_string(),
            kind: movement.movement_type.as_str().to_string(),
            kind_label: movement.movement_type.label().to_string(),
            product: product_name(&movement.product_id),
            quantity: format_quantity(movement.quantity),
            from: movement
                .from_warehouse_id
                .as_deref()
                .map(&warehouse_name)
                .unwrap_or_else(|| "-".to_string()),
            to: movement
                .to_warehouse_id
                .as_deref()
                .map(&warehouse_name)
                .unwrap_or_else(|| "-".to_string()),
            reference: movement.reference.clone().unwrap_or_default(),
            notes: movement.notes.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub chrome: Chrome,
    pub total_asset_value: String,
    pub warehouse_count: usize,
    pub distinct_products: usize,
    pub total_units: String,
    pub warehouses: Vec<WarehouseStockRow>,
    pub low_stock: Vec<LowStockRow>,
    pub recent_movements: Vec<MovementRow>,
}

// ---
// Produtos
// ---
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub price: String,
    pub price_raw: String,
    pub description: String,
}

#[derive(Template)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub chrome: Chrome,
    pub search: String,
    pub rows: Vec<ProductRow>,
    pub pager: Pager,
}

/// Saldo de um produto em um armazém.
pub struct ProductStockRow {
    pub warehouse_id: String,
    pub warehouse: String,
    pub quantity: String,
    pub reorder_level: String,
    pub low_stock: bool,
}

#[derive(Template)]
#[template(path = "product_detail.html")]
pub struct ProductDetailTemplate {
    pub chrome: Chrome,
    pub product: ProductRow,
    pub total_units: String,
    pub stock: Vec<ProductStockRow>,
}

// ---
// Armazéns
// ---
pub struct WarehouseRow {
    pub id: String,
    pub name: String,
    pub location: String,
    pub capacity: String,
}

#[derive(Template)]
#[template(path = "warehouses.html")]
pub struct WarehousesTemplate {
    pub chrome: Chrome,
    pub search: String,
    pub rows: Vec<WarehouseRow>,
    pub pager: Pager,
}

#[derive(Template)]
#[template(path = "warehouse_detail.html")]
pub struct WarehouseDetailTemplate {
    pub chrome: Chrome,
    pub warehouse: WarehouseRow,
    pub total_units: String,
    pub stock: Vec<StockRow>,
}

// ---
// Estoque, movimentações e contagens
// ---
pub struct StockRow {
    pub id: String,
    pub product: String,
    pub sku: String,
    pub quantity: String,
    pub quantity_raw: String,
    pub reorder_level: String,
    pub low_stock: bool,
}

impl StockRow {
    /// `product` e `sku` vêm resolvidos pelo handler (linha embutida ou catálogo).
    pub fn new(item: &InventoryItem, product: String, sku: String) -> Self {
        Self {
            id: item.id.clone(),
            product,
            sku,
            quantity: format_quantity(item.quantity),
            quantity_raw: item.quantity.normalize().to_string(),
            reorder_level: item.reorder_level.map(format_quantity).unwrap_or_default(),
            low_stock: item.is_low_stock(),
        }
    }
}

pub struct DraftRow {
    pub product_id: String,
    pub product: String,
    pub system_quantity: String,
    pub physical_quantity: String,
    pub discrepancy: String,
    pub notes: String,
}

pub struct StatusAction {
    pub value: &'static str,
    pub label: &'static str,
}

pub struct OpnameRow {
    pub id: String,
    pub warehouse: String,
    pub status: String,
    pub created_at: String,
    pub item_count: usize,
    pub notes: String,
    pub actions: Vec<StatusAction>,
}

impl OpnameRow {
    pub fn actions_for(status: StockOpnameStatus) -> Vec<StatusAction> {
        status
            .next_statuses()
            .into_iter()
            .map(|next| StatusAction {
                value: next.as_str(),
                label: match next {
                    StockOpnameStatus::InProgress => "Iniciar",
                    StockOpnameStatus::Completed => "Concluir",
                    StockOpnameStatus::Cancelled => "Cancelar",
                    StockOpnameStatus::Draft => "Rascunho",
                },
            })
            .collect()
    }
}

pub struct MovementFilters {
    pub movement_types: Vec<OptionView>,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Template)]
#[template(path = "inventory.html")]
pub struct InventoryTemplate {
    pub chrome: Chrome,
    pub warehouse_id: String,
    pub warehouse_options: Vec<OptionView>,
    pub product_options: Vec<OptionView>,
    pub search: String,
    pub stock: Vec<StockRow>,
    pub stock_pager: Pager,
    pub filters: MovementFilters,
    pub movements: Vec<MovementRow>,
    pub movement_page: u32,
    pub movement_total_pages: u32,
    pub movement_has_previous: bool,
    pub movement_has_next: bool,
    pub movement_previous_page: u32,
    pub movement_next_page: u32,
    pub net_change: String,
    pub draft_warehouse: String,
    pub draft: Vec<DraftRow>,
    pub opnames: Vec<OpnameRow>,
}

// ---
// Páginas de erro
// ---
#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub path: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_page_escapes_the_message() {
        let html = ErrorTemplate {
            status: 400,
            message: "<script>".into(),
        }
        .render()
        .unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("400"));
    }

    #[test]
    fn pager_reflects_page_bounds() {
        let page = Page::paginate((1..=12).collect::<Vec<_>>(), 1, 10);
        let pager = Pager::from(&page);
        assert!(!pager.has_previous);
        assert!(pager.has_next);
        assert_eq!(pager.next_page, 2);
    }

    #[test]
    fn completed_opnames_have_no_actions() {
        assert!(OpnameRow::actions_for(StockOpnameStatus::Completed).is_empty());
        let labels: Vec<_> = OpnameRow::actions_for(StockOpnameStatus::Draft)
            .into_iter()
            .map(|a| a.value)
            .collect();
        assert_eq!(labels, vec!["IN_PROGRESS", "COMPLETED", "CANCELLED"]);
    }
}
