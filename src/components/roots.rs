//! Root Slice Hook
//!
//! Every root-level view holds its own copy of the root folder list: it
//! fetches on mount and reconciles root-scoped bus messages against that
//! copy, without inheriting state from any other view. This helper wires
//! exactly one such copy; callers never share the returned signal.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::NodeStore;
use crate::context::BibleContext;
use crate::models::{FolderNode, Scope};
use crate::tree::{apply_to_folders, wants_refetch};

pub(crate) fn use_root_folders(tag: &'static str) -> ReadSignal<Vec<FolderNode>> {
    let ctx = use_context::<BibleContext>().expect("BibleContext should be provided");
    let (folders, set_folders) = signal(Vec::<FolderNode>::new());

    let store = ctx.store.clone();
    let load = move || {
        let store = store.clone();
        spawn_local(async move {
            match store.list_subfolders(&Scope::Root).await {
                Ok(loaded) => {
                    let _ = set_folders.try_set(loaded);
                }
                Err(err) => {
                    web_sys::console::error_1(
                        &format!("[{}] Failed to load root folders: {}", tag, err).into(),
                    );
                }
            }
        });
    };
    load();

    // The root list is always considered loaded, so no lazy-expansion gate
    let reload = load.clone();
    let sub = ctx.bus.subscribe(Scope::Root, move |msg| {
        if wants_refetch(&msg.kind) {
            reload();
            return;
        }
        let _ = set_folders.try_update(|f| apply_to_folders(&msg.kind, f));
    });
    let bus = ctx.bus.clone();
    on_cleanup(move || bus.unsubscribe(sub));

    folders
}
