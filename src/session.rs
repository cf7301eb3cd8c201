// src/session.rs

use moka::future::Cache;
use secrecy::{ExposeSecret, Secret};
use std::{
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{cache::QueryCache, models::opname::OpnameDraft};

pub const SESSION_COOKIE: &str = "inventory_session";

// ---
// Tokens emitidos pela API (nunca vão para o navegador)
// ---
#[derive(Default)]
struct Tokens {
    access: Option<Secret<String>>,
    refresh: Option<Secret<String>>,
}

#[derive(Default)]
pub struct TokenStore {
    inner: RwLock<Tokens>,
}

impl TokenStore {
    pub async fn access_token(&self) -> Option<String> {
        let tokens = self.inner.read().await;
        tokens.access.as_ref().map(|t| t.expose_secret().clone())
    }

    pub async fn refresh_token(&self) -> Option<String> {
        let tokens = self.inner.read().await;
        tokens.refresh.as_ref().map(|t| t.expose_secret().clone())
    }

    pub async fn has_token(&self) -> bool {
        self.inner.read().await.access.is_some()
    }

    /// Depois do login/registro: substitui os dois tokens.
    pub async fn set(&self, access_token: String, refresh_token: Option<String>) {
        let mut tokens = self.inner.write().await;
        tokens.access = Some(Secret::new(access_token));
        tokens.refresh = refresh_token.map(Secret::new);
    }

    /// Depois de um refresh: a API pode ou não girar o refresh token.
    pub async fn store_refreshed(&self, access_token: String, refresh_token: Option<String>) {
        let mut tokens = self.inner.write().await;
        tokens.access = Some(Secret::new(access_token));
        if let Some(refresh) = refresh_token {
            tokens.refresh = Some(Secret::new(refresh));
        }
    }

    pub async fn clear(&self) {
        let mut tokens = self.inner.write().await;
        tokens.access = None;
        tokens.refresh = None;
    }
}

// ---
// Notificações de uma só exibição ("toast")
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashKind::Success => "toast-success",
            FlashKind::Error => "toast-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

// ---
// Sessão de um navegador
// ---
// O id não fica aqui: é a chave no `SessionStore` e o valor do cookie.
pub struct Session {
    pub tokens: TokenStore,
    pub cache: QueryCache,
    flash: Mutex<Vec<Flash>>,
    opname_draft: Mutex<OpnameDraft>,
    renew_id: AtomicBool,
}

// Um Mutex envenenado só significa que outra requisição entrou em pânico
// no meio da escrita; os dados continuam utilizáveis.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Session {
    pub fn new() -> Self {
        Self {
            tokens: TokenStore::default(),
            cache: QueryCache::new(),
            flash: Mutex::new(Vec::new()),
            opname_draft: Mutex::new(OpnameDraft::default()),
            renew_id: AtomicBool::new(false),
        }
    }

    /// Login e registro: a sessão troca de id no fim da requisição, e o
    /// cookie emitido antes do login deixa de valer.
    pub fn renew_id(&self) {
        self.renew_id.store(true, Ordering::Relaxed);
    }

    pub fn take_renewal(&self) -> bool {
        self.renew_id.swap(false, Ordering::Relaxed)
    }

    /// Uma sessão anônima só merece ir para o store com um login ou uma
    /// notificação ainda não exibida.
    pub async fn worth_keeping(&self) -> bool {
        !lock(&self.flash).is_empty() || self.tokens.has_token().await
    }

    pub fn push_flash(&self, kind: FlashKind, message: impl Into<String>) {
        lock(&self.flash).push(Flash {
            kind,
            message: message.into(),
        });
    }

    pub fn take_flash(&self) -> Vec<Flash> {
        std::mem::take(&mut *lock(&self.flash))
    }

    /// Acesso ao rascunho da contagem. O guard não atravessa `.await`.
    pub fn with_draft<R>(&self, f: impl FnOnce(&mut OpnameDraft) -> R) -> R {
        f(&mut lock(&self.opname_draft))
    }

    /// Logout: tokens, cache e rascunho vão embora juntos.
    pub async fn reset(&self) {
        self.tokens.clear().await;
        self.cache.clear();
        *lock(&self.opname_draft) = OpnameDraft::default();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, Arc<Session>>,
}

impl SessionStore {
    /// Sessões sem uso por `idle` somem sozinhas.
    pub fn new(idle: Duration) -> Self {
        let sessions = Cache::builder()
            .max_capacity(10_000)
            .time_to_idle(idle)
            .build();
        Self { sessions }
    }

    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.get(id).await
    }

    /// Guarda a sessão sob um id novo, que vai para o cookie.
    pub async fn insert(&self, session: Arc<Session>) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions.insert(id.clone(), session).await;
        tracing::debug!("Nova sessão guardada");
        id
    }

    /// Mesma sessão, id novo; o antigo some do store.
    pub async fn rotate(&self, old_id: &str, session: Arc<Session>) -> String {
        let id = self.insert(session).await;
        self.sessions.invalidate(old_id).await;
        tracing::debug!("🔑 Id de sessão renovado");
        id
    }
}
