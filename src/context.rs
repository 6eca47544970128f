//! Application Context
//!
//! The injected handle bundle shared by every surface: the message bus, the
//! mutation coordinator, the store adapter, and a couple of app-wide signals.
//! Constructed once at the root and provided via Leptos context; nothing in
//! the app reaches these through a global.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use gloo_timers::future::TimeoutFuture;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::ApiNodeStore;
use crate::bus::TreeBus;
use crate::models::EntityNode;
use crate::sync::SyncCoordinator;

/// How long a transient notice stays on screen
const NOTICE_MS: u32 = 4000;

#[derive(Clone)]
pub struct BibleContext {
    pub bus: TreeBus,
    pub store: ApiNodeStore,
    pub sync: SyncCoordinator<ApiNodeStore>,
    /// Entity highlighted across surfaces - read
    pub selected_entity: ReadSignal<Option<EntityNode>>,
    set_selected_entity: WriteSignal<Option<EntityNode>>,
    /// Transient error/status banner - read
    pub notice: ReadSignal<Option<String>>,
    set_notice: WriteSignal<Option<String>>,
    notice_seq: Arc<AtomicU64>,
}

impl BibleContext {
    pub fn new(store: ApiNodeStore) -> Self {
        let bus = TreeBus::new();
        let sync = SyncCoordinator::new(store.clone(), bus.clone());
        let (selected_entity, set_selected_entity) = signal(None::<EntityNode>);
        let (notice, set_notice) = signal(None::<String>);
        Self {
            bus,
            store,
            sync,
            selected_entity,
            set_selected_entity,
            notice,
            set_notice,
            notice_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn select_entity(&self, entity: Option<EntityNode>) {
        self.set_selected_entity.set(entity);
    }

    /// Show a transient notice that dismisses itself, unless a newer one
    /// replaced it in the meantime
    pub fn show_notice(&self, text: impl Into<String>) {
        let seq = self.notice_seq.fetch_add(1, Ordering::Relaxed) + 1;
        self.set_notice.set(Some(text.into()));

        let guard = Arc::clone(&self.notice_seq);
        let set_notice = self.set_notice;
        spawn_local(async move {
            TimeoutFuture::new(NOTICE_MS).await;
            if guard.load(Ordering::Relaxed) == seq {
                let _ = set_notice.try_set(None);
            }
        });
    }

    /// Blocking alert for failed destructive operations
    pub fn alert(&self, text: &str) {
        if let Some(win) = web_sys::window() {
            let _ = win.alert_with_message(text);
        }
    }
}
