// src/services/opname_service.rs

use rust_decimal::Decimal;

use crate::{
    api::InventoryRepository,
    cache::{QueryKey, keys},
    common::{error::AppError, validation::field_error},
    models::{
        inventory::{NewStockMovement, StockMovementType},
        opname::{
            OpnameDraft, OpnameList, OpnameQuery, OpnameStatusUpdate, StockOpname, StockOpnameStatus,
        },
    },
    services::{catalog_service::CatalogService, inventory_service::InventoryService},
    session::Session,
};

#[derive(Clone)]
pub struct OpnameService {
    inventory_repo: InventoryRepository,
    inventory_service: InventoryService,
    catalog_service: CatalogService,
}

impl OpnameService {
    pub fn new(
        inventory_repo: InventoryRepository,
        inventory_service: InventoryService,
        catalog_service: CatalogService,
    ) -> Self {
        Self {
            inventory_repo,
            inventory_service,
            catalog_service,
        }
    }

    // ---
    // Rascunho (fica na sessão até o envio)
    // ---

    pub fn draft(&self, session: &Session) -> OpnameDraft {
        session.with_draft(|draft| draft.clone())
    }

    pub fn select_warehouse(&self, session: &Session, warehouse_id: &str) {
        session.with_draft(|draft| draft.select_warehouse(warehouse_id));
    }

    /// Adiciona um produto à contagem com a quantidade do sistema tirada do
    /// estoque do armazém (0 se não houver linha). Produto repetido é ignorado.
    pub async fn add_item(&self, session: &Session, product_id: &str) -> Result<bool, AppError> {
        let warehouse_id = session
            .with_draft(|draft| draft.warehouse_id.clone())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| field_error("warehouseId", "required", "Selecione o armazém primeiro."))?;

        let products = self.catalog_service.list(session).await?;
        if !products.iter().any(|p| p.id == product_id) {
            return Err(AppError::NotFound(format!("Produto {}", product_id)));
        }

        let stock = self
            .inventory_service
            .warehouse_inventory(session, &warehouse_id)
            .await?;
        let system_quantity = stock
            .iter()
            .find(|item| item.product_id == product_id)
            .map(|item| item.quantity)
            .unwrap_or(Decimal::ZERO);

        Ok(session.with_draft(|draft| {
            // O armazém pode ter mudado enquanto o estoque era buscado.
            if draft.warehouse_id.as_deref() != Some(warehouse_id.as_str()) {
                return false;
            }
            draft.add_line(product_id, system_quantity)
        }))
    }

    pub fn remove_item(&self, session: &Session, product_id: &str) -> bool {
        session.with_draft(|draft| draft.remove_line(product_id))
    }

    pub fn set_physical(
        &self,
        session: &Session,
        product_id: &str,
        physical_quantity: Decimal,
        notes: Option<String>,
    ) -> Result<(), AppError> {
        session.with_draft(|draft| draft.set_physical(product_id, physical_quantity, notes))?;
        Ok(())
    }

    /// Envia a contagem. O rascunho só é descartado se a API aceitar.
    pub async fn submit(&self, session: &Session, notes: Option<String>) -> Result<StockOpname, AppError> {
        let payload = session.with_draft(|draft| draft.to_payload(notes))?;
        let opname = self.inventory_repo.create_opname(&session.tokens, &payload).await?;

        session.with_draft(|draft| *draft = OpnameDraft::default());
        session.cache.invalidate(&keys::stock_opnames());
        session.cache.invalidate(&keys::inventory());
        tracing::info!(
            "📋 Contagem {} enviada ({} itens) para o armazém {}",
            opname.id,
            payload.items.len(),
            payload.warehouse_id
        );
        Ok(opname)
    }

    // ---
    // Contagens gravadas
    // ---

    pub async fn list(&self, session: &Session, query: &OpnameQuery) -> Result<OpnameList, AppError> {
        let key = QueryKey::with_params("stock-opnames", query);
        session
            .cache
            .fetch(key, || self.inventory_repo.list_opnames(&session.tokens, query))
            .await
    }

    /// Muda o status direto na API, que é quem valida a transição (a contagem
    /// pode nem estar na primeira página da lista). Ao concluir, cada
    /// divergência da contagem devolvida vira um ajuste de estoque.
    pub async fn update_status(
        &self,
        session: &Session,
        id: &str,
        status: StockOpnameStatus,
    ) -> Result<StockOpname, AppError> {
        let updated = self
            .inventory_repo
            .update_opname_status(&session.tokens, id, &OpnameStatusUpdate { status })
            .await?;
        session.cache.invalidate(&keys::stock_opnames());
        session.cache.invalidate(&keys::inventory());
        tracing::info!("📋 Contagem {} -> {}", id, updated.status);

        if status == StockOpnameStatus::Completed {
            self.post_adjustments(session, &updated).await?;
        }

        Ok(updated)
    }

    // Uma falha não interrompe os demais ajustes: depois de COMPLETED não há
    // como reenviar pela contagem, então tudo que der é gravado e o resto é reportado.
    async fn post_adjustments(&self, session: &Session, opname: &StockOpname) -> Result<(), AppError> {
        let movements = adjustments(opname);
        let count = movements.len();
        let mut failed = Vec::new();

        for movement in movements {
            let product_id = movement.product_id.clone();
            if let Err(e) = self
                .inventory_service
                .create_stock_movement(session, movement)
                .await
            {
                if e.is_session_error() {
                    return Err(e);
                }
                tracing::error!("Ajuste de {} na contagem {} falhou: {}", product_id, opname.id, e);
                failed.push(product_id);
            }
        }

        if !failed.is_empty() {
            return Err(AppError::AdjustmentsFailed {
                opname: opname.id.clone(),
                products: failed.join(", "),
            });
        }

        tracing::info!("📋 Contagem {} concluída com {} ajustes", opname.id, count);
        Ok(())
    }
}

/// Um ajuste por item com divergência: sobra entra no armazém, falta sai dele.
pub fn adjustments(opname: &StockOpname) -> Vec<NewStockMovement> {
    opname
        .items
        .iter()
        .filter(|line| !line.discrepancy().is_zero())
        .map(|line| {
            let delta = line.discrepancy();
            let (from, to) = if delta.is_sign_positive() {
                (None, Some(opname.warehouse_id.clone()))
            } else {
                (Some(opname.warehouse_id.clone()), None)
            };
            NewStockMovement {
                product_id: line.product_id.clone(),
                movement_type: StockMovementType::Adjustment,
                quantity: delta.abs(),
                from_warehouse_id: from,
                to_warehouse_id: to,
                reference: Some(format!("OPNAME-{}", opname.id)),
                notes: line.notes.clone(),
            }
        })
        .collect()
}
