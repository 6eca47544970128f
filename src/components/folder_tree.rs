//! Folder Tree Node Component
//!
//! One folder in the explorer tree: owns its own expanded state, lazily
//! fetches its children on first expansion, and keeps them consistent by
//! applying bus messages scoped to its own id. Subfolders render as nested
//! tree nodes, entities as draggable leaf rows.

use leptos::prelude::*;
use leptos::task::spawn_local;

use leptos_dragdrop::{
    make_on_folder_mouseenter, make_on_mousedown, make_on_mouseleave, DndSignals, DragSource,
    DropTarget,
};

use crate::api::{ApiNodeStore, NodeStore};
use crate::bus::{NodeKind, TreeMessage, TreeMessageKind};
use crate::components::{DeleteConfirmButton, DraftNameInput};
use crate::context::BibleContext;
use crate::models::{EntityKind, EntityNode, FolderKind, FolderNode, Scope};
use crate::tree::{apply_to_entities, apply_to_folders, wants_refetch};

/// What the context menu is open for
#[derive(Clone)]
enum MenuTarget {
    Folder,
    Entity(EntityNode),
}

/// Subfolders and entities are fetched concurrently, like the rest of the
/// folder views
async fn fetch_children(
    store: &ApiNodeStore,
    folder_id: &str,
) -> Result<(Vec<FolderNode>, Vec<EntityNode>), String> {
    let scope = Scope::Folder(folder_id.to_string());
    let (subs, ents) = futures::future::join(
        store.list_subfolders(&scope),
        store.list_entities(folder_id),
    )
    .await;
    Ok((subs?, ents?))
}

#[component]
pub fn FolderTreeNode(folder: FolderNode, depth: usize) -> impl IntoView {
    let ctx = use_context::<BibleContext>().expect("BibleContext should be provided");
    let dnd = use_context::<DndSignals>().expect("DndSignals should be provided");

    let folder_id = folder.id.clone();
    let folder_name = folder.name.clone();
    let folder_kind = folder.kind;
    let folder_pending = folder.pending;
    let scope = Scope::Folder(folder_id.clone());
    let indent = depth * 12;

    let (expanded, set_expanded) = signal(false);
    let (loaded, set_loaded) = signal(false);
    let (loading, set_loading) = signal(false);
    let (subfolders, set_subfolders) = signal(Vec::<FolderNode>::new());
    let (entities, set_entities) = signal(Vec::<EntityNode>::new());
    let (menu, set_menu) = signal(None::<(f64, f64, MenuTarget)>);
    let (rename_value, set_rename_value) = signal(None::<String>);
    // Temp ids of drafts started from this node; only these render editable
    let (own_drafts, set_own_drafts) = signal(Vec::<String>::new());

    // Load children logic
    let store = ctx.store.clone();
    let load_id = folder_id.clone();
    let load_children = move || {
        let store = store.clone();
        let id = load_id.clone();
        set_loading.set(true);
        spawn_local(async move {
            match fetch_children(&store, &id).await {
                Ok((subs, ents)) => {
                    let _ = set_subfolders.try_set(subs);
                    let _ = set_entities.try_set(ents);
                    let _ = set_loaded.try_set(true);
                }
                Err(err) => {
                    web_sys::console::error_1(
                        &format!("[TREE] Failed to load folder {}: {}", id, err).into(),
                    );
                    // Collapse again so the next toggle retries
                    let _ = set_expanded.try_set(false);
                }
            }
            let _ = set_loading.try_set(false);
        });
    };

    // Subscribe for this node's lifetime; deregister on unmount
    let reload = load_children.clone();
    let sub = ctx.bus.subscribe(scope.clone(), move |msg| {
        // Not loaded yet: the next expansion fetches fresh data anyway
        if !loaded.get_untracked() {
            return;
        }
        if wants_refetch(&msg.kind) {
            reload();
            return;
        }
        let _ = set_subfolders.try_update(|f| apply_to_folders(&msg.kind, f));
        let _ = set_entities.try_update(|e| apply_to_entities(&msg.kind, e));
    });
    let bus = ctx.bus.clone();
    on_cleanup(move || bus.unsubscribe(sub));

    // Expansion is idempotent: toggling open while loaded refetches nothing
    let load_toggle = load_children.clone();
    let toggle = move |ev: web_sys::MouseEvent| {
        ev.stop_propagation();
        let open = !expanded.get();
        set_expanded.set(open);
        if open && !loaded.get() && !loading.get() {
            load_toggle();
        }
    };

    let on_folder_context = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        ev.stop_propagation();
        // No destructive menu on an unconfirmed folder
        if folder_pending {
            return;
        }
        set_menu.set(Some((
            ev.client_x() as f64,
            ev.client_y() as f64,
            MenuTarget::Folder,
        )));
    };

    let on_entity_context = move |ev: web_sys::MouseEvent, entity: EntityNode| {
        ev.prevent_default();
        ev.stop_propagation();
        if entity.pending {
            return;
        }
        set_menu.set(Some((
            ev.client_x() as f64,
            ev.client_y() as f64,
            MenuTarget::Entity(entity),
        )));
    };

    // Start an inline draft under this folder. Expands first and waits for
    // the children to be loaded so the optimistic insert is not dropped.
    let begin_draft = {
        let sync = ctx.sync.clone();
        let store = ctx.store.clone();
        let id = folder_id.clone();
        move |entity_kind: Option<EntityKind>| {
            let sync = sync.clone();
            let store = store.clone();
            let id = id.clone();
            set_expanded.set(true);
            spawn_local(async move {
                if !loaded.get_untracked() {
                    match fetch_children(&store, &id).await {
                        Ok((subs, ents)) => {
                            let _ = set_subfolders.try_set(subs);
                            let _ = set_entities.try_set(ents);
                            let _ = set_loaded.try_set(true);
                        }
                        Err(err) => {
                            web_sys::console::error_1(
                                &format!("[TREE] Failed to load folder {}: {}", id, err).into(),
                            );
                            return;
                        }
                    }
                }
                let temp_id = match entity_kind {
                    Some(kind) => sync.begin_entity_draft(&id, kind),
                    None => sync.begin_folder_draft(&Scope::Folder(id.clone()), FolderKind::Folder),
                };
                let _ = set_own_drafts.try_update(|d| d.push(temp_id));
            });
        }
    };

    // Rename commit for this folder's own row
    let commit_rename = {
        let ctx = ctx.clone();
        let folder = folder.clone();
        move |value: String| {
            set_rename_value.set(None);
            let value = value.trim().to_string();
            if value.is_empty() || value == folder.name {
                return;
            }
            let ctx = ctx.clone();
            let folder = folder.clone();
            spawn_local(async move {
                if let Err(err) = ctx.sync.rename_folder(&folder, &value).await {
                    web_sys::console::error_1(&format!("[TREE] Rename failed: {}", err).into());
                    ctx.show_notice(format!("Could not rename \"{}\": {}", folder.name, err));
                }
            });
        }
    };

    let refresh = {
        let bus = ctx.bus.clone();
        let scope = scope.clone();
        move || {
            bus.publish(TreeMessage {
                scope: scope.clone(),
                kind: TreeMessageKind::Invalidate,
            });
        }
    };

    let delete_folder_action = {
        let ctx = ctx.clone();
        let folder = folder.clone();
        Callback::new(move |_: ()| {
            set_menu.set(None);
            let ctx = ctx.clone();
            let folder = folder.clone();
            spawn_local(async move {
                if let Err(err) = ctx.sync.delete_folder(&folder).await {
                    web_sys::console::error_1(
                        &format!("[TREE] Delete folder failed: {}", err).into(),
                    );
                    ctx.alert(&format!("Could not delete \"{}\": {}", folder.name, err));
                }
            });
        })
    };

    // Drop target wiring for the folder row
    let dt_id = folder_id.clone();
    let on_row_mouseenter = make_on_folder_mouseenter(dnd, folder_id.clone());
    let on_row_mouseleave = make_on_mouseleave(dnd);
    let is_drop_target = move || {
        matches!(dnd.drop_target_read.get(), Some(DropTarget::Folder(ref fid)) if *fid == dt_id)
    };

    let row_class = move || {
        let mut c = String::from("tree-folder-row");
        if folder_pending {
            c.push_str(" pending");
        }
        if is_drop_target() {
            c.push_str(" drop-target");
        }
        c
    };

    let ctx_menu = ctx.clone();
    let begin_draft_menu = begin_draft.clone();
    let commit_rename_row = commit_rename.clone();
    let folder_name_row = folder_name.clone();
    let menu_name = folder_name.clone();

    view! {
        <div class="tree-node">
            <div
                class=row_class
                style=format!("padding-left: {}px;", indent + 4)
                on:click=toggle
                on:contextmenu=on_folder_context
                on:mouseenter=on_row_mouseenter
                on:mouseleave=on_row_mouseleave
            >
                <span class="toggle-icon">
                    {move || if expanded.get() { "▼" } else { "▶" }}
                </span>
                <span class="folder-glyph" title=folder_kind.label()>{folder_kind.glyph()}</span>
                {move || match rename_value.get() {
                    Some(value) => {
                        let commit_key = commit_rename_row.clone();
                        let commit_blur = commit_rename_row.clone();
                        view! {
                            <input
                                type="text"
                                class="rename-input"
                                autofocus=true
                                prop:value=value
                                on:click=|ev| ev.stop_propagation()
                                on:keydown=move |ev: web_sys::KeyboardEvent| {
                                    match ev.key().as_str() {
                                        "Enter" => {
                                            ev.prevent_default();
                                            commit_key(event_target_value(&ev));
                                        }
                                        "Escape" => set_rename_value.set(None),
                                        _ => {}
                                    }
                                }
                                on:blur=move |ev| commit_blur(event_target_value(&ev))
                            />
                        }
                        .into_any()
                    }
                    None => view! {
                        <span class="folder-name">{folder_name_row.clone()}</span>
                    }
                    .into_any(),
                }}
            </div>

            // Context menu
            {move || menu.get().map(|(x, y, target)| {
                let ctx = ctx_menu.clone();
                let begin_draft = begin_draft_menu.clone();
                let refresh = refresh.clone();
                let title = menu_name.clone();
                view! {
                    <div class="menu-overlay"
                        on:click=move |_| set_menu.set(None)
                        on:contextmenu=|ev| ev.prevent_default()
                    ></div>
                    <div
                        class="context-menu"
                        style=format!("top: {}px; left: {}px;", y, x)
                        on:click=|ev| ev.stop_propagation()
                    >
                        {match target {
                            MenuTarget::Folder => {
                                let draft_folder = begin_draft.clone();
                                let draft_character = begin_draft.clone();
                                let draft_location = begin_draft.clone();
                                let draft_map = begin_draft.clone();
                                let rename_name = title.clone();
                                view! {
                                    <div class="menu-title">{title}</div>
                                    <button class="menu-item" on:click=move |_| {
                                        set_menu.set(None);
                                        draft_folder(None);
                                    }>"📁 New Subfolder"</button>
                                    <button class="menu-item" on:click=move |_| {
                                        set_menu.set(None);
                                        draft_character(Some(EntityKind::Character));
                                    }>"👤 New Character"</button>
                                    <button class="menu-item" on:click=move |_| {
                                        set_menu.set(None);
                                        draft_location(Some(EntityKind::Location));
                                    }>"📍 New Location"</button>
                                    <button class="menu-item" on:click=move |_| {
                                        set_menu.set(None);
                                        draft_map(Some(EntityKind::Map));
                                    }>"🗺️ New Map"</button>
                                    <button class="menu-item" on:click=move |_| {
                                        set_menu.set(None);
                                        set_rename_value.set(Some(rename_name.clone()));
                                    }>"✏️ Rename"</button>
                                    <button class="menu-item" on:click=move |_| {
                                        set_menu.set(None);
                                        refresh();
                                    }>"↻ Refresh"</button>
                                    <div class="menu-separator"></div>
                                    <div class="menu-item destructive">
                                        "Delete Folder "
                                        <DeleteConfirmButton
                                            button_class="delete-btn"
                                            on_confirm=delete_folder_action
                                        />
                                    </div>
                                }
                                .into_any()
                            }
                            MenuTarget::Entity(entity) => {
                                let name = entity.name.clone();
                                let dup_ctx = ctx.clone();
                                let dup_id = entity.id.clone();
                                let del_ctx = ctx.clone();
                                let del_entity = entity.clone();
                                let delete_entity_action = Callback::new(move |_: ()| {
                                    set_menu.set(None);
                                    let ctx = del_ctx.clone();
                                    let entity = del_entity.clone();
                                    spawn_local(async move {
                                        if let Err(err) = ctx.sync.delete_entity(&entity).await {
                                            web_sys::console::error_1(
                                                &format!("[TREE] Delete entity failed: {}", err).into(),
                                            );
                                            ctx.alert(&format!(
                                                "Could not delete \"{}\": {}",
                                                entity.name, err
                                            ));
                                        }
                                    });
                                });
                                view! {
                                    <div class="menu-title">{name}</div>
                                    <button class="menu-item" on:click=move |_| {
                                        set_menu.set(None);
                                        let ctx = dup_ctx.clone();
                                        let id = dup_id.clone();
                                        spawn_local(async move {
                                            if let Err(err) = ctx.sync.duplicate_entity(&id).await {
                                                web_sys::console::error_1(
                                                    &format!("[TREE] Duplicate failed: {}", err).into(),
                                                );
                                                ctx.show_notice(format!("Could not duplicate entity: {}", err));
                                            }
                                        });
                                    }>"⧉ Duplicate"</button>
                                    <div class="menu-separator"></div>
                                    <div class="menu-item destructive">
                                        "Delete Entity "
                                        <DeleteConfirmButton
                                            button_class="delete-btn"
                                            on_confirm=delete_entity_action
                                        />
                                    </div>
                                }
                                .into_any()
                            }
                        }}
                    </div>
                }
            })}

            // Children
            <Show when=move || expanded.get()>
                <div class="tree-children">
                    <Show
                        when=move || !loading.get()
                        fallback=|| view! { <div class="loading small">"Loading..."</div> }
                    >
                        // Subfolders
                        <For
                            each=move || subfolders.get()
                            key=|f| (f.id.clone(), f.name.clone(), f.pending, f.draft)
                            children=move |sub| {
                                if sub.draft {
                                    let editable = own_drafts.get_untracked().contains(&sub.id);
                                    if editable {
                                        let ctx = use_context::<BibleContext>()
                                            .expect("BibleContext should be provided");
                                        let temp_id = sub.id.clone();
                                        let parent = sub.parent_scope();
                                        let kind = sub.kind;
                                        let cancel_ctx = ctx.clone();
                                        let cancel_temp = sub.id.clone();
                                        let cancel_parent = parent.clone();
                                        view! {
                                            <DraftNameInput
                                                placeholder="Folder name..."
                                                on_commit=Callback::new(move |name: String| {
                                                    let ctx = ctx.clone();
                                                    let temp_id = temp_id.clone();
                                                    let parent = parent.clone();
                                                    spawn_local(async move {
                                                        if let Err(err) = ctx
                                                            .sync
                                                            .commit_folder_draft(&temp_id, &name, &parent, kind)
                                                            .await
                                                        {
                                                            web_sys::console::error_1(
                                                                &format!("[TREE] Create folder failed: {}", err).into(),
                                                            );
                                                            ctx.show_notice(format!("Could not create folder: {}", err));
                                                        }
                                                    });
                                                })
                                                on_cancel=Callback::new(move |_: ()| {
                                                    cancel_ctx.sync.cancel_draft(
                                                        &cancel_temp,
                                                        &cancel_parent,
                                                        NodeKind::Folder,
                                                    );
                                                })
                                            />
                                        }
                                        .into_any()
                                    } else {
                                        view! {
                                            <div class="tree-folder-row pending draft">
                                                <span class="folder-glyph">{sub.kind.glyph()}</span>
                                                <span class="folder-name">"…"</span>
                                            </div>
                                        }
                                        .into_any()
                                    }
                                } else {
                                    view! {
                                        <FolderTreeNode folder=sub depth=depth + 1 />
                                    }
                                    .into_any()
                                }
                            }
                        />

                        // Entities
                        <For
                            each=move || entities.get()
                            key=|e| (e.id.clone(), e.name.clone(), e.pending, e.draft)
                            children=move |entity| {
                                if entity.draft {
                                    let editable = own_drafts.get_untracked().contains(&entity.id);
                                    if editable {
                                        let ctx = use_context::<BibleContext>()
                                            .expect("BibleContext should be provided");
                                        let temp_id = entity.id.clone();
                                        let folder_id = entity.folder_id.clone();
                                        let kind = entity.kind;
                                        let cancel_ctx = ctx.clone();
                                        let cancel_temp = entity.id.clone();
                                        let cancel_scope = entity.scope();
                                        view! {
                                            <DraftNameInput
                                                placeholder="Name..."
                                                on_commit=Callback::new(move |name: String| {
                                                    let ctx = ctx.clone();
                                                    let temp_id = temp_id.clone();
                                                    let folder_id = folder_id.clone();
                                                    spawn_local(async move {
                                                        if let Err(err) = ctx
                                                            .sync
                                                            .commit_entity_draft(&temp_id, &name, &folder_id, kind)
                                                            .await
                                                        {
                                                            web_sys::console::error_1(
                                                                &format!("[TREE] Create entity failed: {}", err).into(),
                                                            );
                                                            ctx.show_notice(format!("Could not create entity: {}", err));
                                                        }
                                                    });
                                                })
                                                on_cancel=Callback::new(move |_: ()| {
                                                    cancel_ctx.sync.cancel_draft(
                                                        &cancel_temp,
                                                        &cancel_scope,
                                                        NodeKind::Entity,
                                                    );
                                                })
                                            />
                                        }
                                        .into_any()
                                    } else {
                                        view! {
                                            <div class="tree-entity-row pending draft">
                                                <span class="entity-glyph">{entity.kind.glyph()}</span>
                                                <span class="entity-name">"…"</span>
                                            </div>
                                        }
                                        .into_any()
                                    }
                                } else {
                                    view! {
                                        <EntityRow entity=entity on_menu=on_entity_context />
                                    }
                                    .into_any()
                                }
                            }
                        />

                        <Show when=move || {
                            loaded.get() && subfolders.get().is_empty() && entities.get().is_empty()
                        }>
                            <div class="empty-folder">"Empty"</div>
                        </Show>
                    </Show>
                </div>
            </Show>
        </div>
    }
}

/// A single entity leaf row: selectable, draggable unless pending
#[component]
fn EntityRow(
    entity: EntityNode,
    on_menu: impl Fn(web_sys::MouseEvent, EntityNode) + Copy + Send + Sync + 'static,
) -> impl IntoView {
    let ctx = use_context::<BibleContext>().expect("BibleContext should be provided");
    let dnd = use_context::<DndSignals>().expect("DndSignals should be provided");

    let pending = entity.pending;
    let name = entity.name.clone();
    let glyph = entity.kind.glyph();
    let label = entity.kind.label();

    let on_mousedown = make_on_mousedown(
        dnd,
        DragSource {
            entity_id: entity.id.clone(),
            source_folder: entity.folder_id.clone(),
        },
    );

    let sel_id = entity.id.clone();
    let is_selected = move || {
        ctx.selected_entity
            .get()
            .is_some_and(|sel| sel.id == sel_id)
    };

    let drag_id = entity.id.clone();
    let is_dragging = move || {
        dnd.dragging_read
            .get()
            .is_some_and(|d| d.entity_id == drag_id)
    };

    let row_class = move || {
        let mut c = String::from("tree-entity-row");
        if pending {
            c.push_str(" pending");
        }
        if is_selected() {
            c.push_str(" selected");
        }
        if is_dragging() {
            c.push_str(" dragging");
        }
        c
    };

    let select_ctx = use_context::<BibleContext>().expect("BibleContext should be provided");
    let select_entity = entity.clone();
    let menu_entity = entity.clone();

    view! {
        <div
            class=row_class
            on:click=move |ev| {
                ev.stop_propagation();
                select_ctx.select_entity(Some(select_entity.clone()));
            }
            on:contextmenu=move |ev| on_menu(ev, menu_entity.clone())
            on:mousedown=move |ev| {
                if !pending {
                    on_mousedown(ev);
                }
            }
        >
            <span class="entity-glyph" title=label>{glyph}</span>
            <span class="entity-name">{name}</span>
            {pending.then(|| view! { <span class="pending-dot">"•"</span> })}
        </div>
    }
}
