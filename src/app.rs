//! World Bible App
//!
//! App shell: constructs the store adapter, the message bus, the mutation
//! coordinator and the DnD signals, provides them through context, and
//! mounts the three independent root-level views side by side.

use leptos::prelude::*;
use leptos::task::spawn_local;

use leptos_dragdrop::{bind_global_mouseup, create_dnd_signals, DropTarget};

use crate::api::{ApiNodeStore, NodeStore, DEFAULT_API_BASE};
use crate::components::{BibleGrid, ExplorerSidebar, GlobalPanel};
use crate::context::BibleContext;

#[component]
pub fn App() -> impl IntoView {
    let ctx = BibleContext::new(ApiNodeStore::new(DEFAULT_API_BASE));
    provide_context(ctx.clone());

    let dnd = create_dnd_signals();
    provide_context(dnd);

    // Route drops into the move operation: resolve the dragged entity,
    // then reparent it. Pending entities never start a drag.
    let drop_ctx = ctx.clone();
    bind_global_mouseup(dnd, move |source, target| {
        let DropTarget::Folder(target_id) = target;
        if source.source_folder == target_id {
            return;
        }
        let ctx = drop_ctx.clone();
        spawn_local(async move {
            web_sys::console::log_1(
                &format!(
                    "[DND] Drop: entity={}, source={}, target={}",
                    source.entity_id, source.source_folder, target_id
                )
                .into(),
            );
            let entity = match ctx.store.get_entity(&source.entity_id).await {
                Ok(entity) => entity,
                Err(err) => {
                    web_sys::console::error_1(
                        &format!("[DND] Failed to resolve dragged entity: {}", err).into(),
                    );
                    ctx.show_notice(format!("Could not move entity: {}", err));
                    return;
                }
            };
            if let Err(err) = ctx.sync.move_entity(&entity, &target_id).await {
                web_sys::console::error_1(&format!("[DND] Move failed: {}", err).into());
                ctx.show_notice(format!("Could not move \"{}\": {}", entity.name, err));
            }
        });
    });

    let notice = ctx.notice;

    view! {
        <div class="app-layout">
            // Left: recursive explorer tree
            <ExplorerSidebar />

            // Center: flat root grid
            <main class="main-content">
                <BibleGrid />
            </main>

            // Right: global side-panel tree
            <GlobalPanel />

            {move || notice.get().map(|text| view! {
                <div class="notice-banner">{text}</div>
            })}
        </div>
    }
}
