//! Bible Grid View
//!
//! Flat root registry: a card grid over its own copy of the root folder
//! list, with inline rename, a context menu, and typed folder creation.
//! Reconciles the same root-scoped messages as the other registries.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::{use_root_folders, CreateFolderModal, DeleteConfirmButton};
use crate::context::BibleContext;
use crate::models::FolderNode;

#[component]
pub fn BibleGrid() -> impl IntoView {
    let ctx = use_context::<BibleContext>().expect("BibleContext should be provided");
    let folders = use_root_folders("GRID");

    let (menu, set_menu) = signal(None::<(f64, f64, FolderNode)>);
    let (renaming, set_renaming) = signal(None::<FolderNode>);
    let (modal_open, set_modal_open) = signal(false);

    let commit_rename = {
        let ctx = ctx.clone();
        move |folder: FolderNode, value: String| {
            set_renaming.set(None);
            let value = value.trim().to_string();
            if value.is_empty() || value == folder.name {
                return;
            }
            let ctx = ctx.clone();
            spawn_local(async move {
                if let Err(err) = ctx.sync.rename_folder(&folder, &value).await {
                    web_sys::console::error_1(&format!("[GRID] Rename failed: {}", err).into());
                    ctx.show_notice(format!("Could not rename \"{}\": {}", folder.name, err));
                }
            });
        }
    };

    let ctx_menu = ctx.clone();
    let commit_rename_card = commit_rename.clone();

    view! {
        <div class="bible-grid-view">
            <header class="grid-header">
                <div>
                    <h1>"World Bible"</h1>
                    <p class="grid-subtitle">"The central archive of this world"</p>
                </div>
                <button
                    class="new-folder-btn"
                    on:click=move |_| set_modal_open.set(true)
                >
                    "📁 New Folder"
                </button>
            </header>

            <div class="card-grid">
                <For
                    each=move || folders.get()
                    key=|f| (f.id.clone(), f.name.clone(), f.pending, f.draft)
                    children=move |folder| {
                        let commit = commit_rename_card.clone();
                        // Rename state has to stay reactive within the row
                        view! {
                            {move || {
                                let folder = folder.clone();
                                let commit = commit.clone();
                                if folder.draft {
                                    view! {
                                        <div class="folder-card pending">
                                            <span class="card-glyph">{folder.kind.glyph()}</span>
                                            <span class="card-name">"…"</span>
                                        </div>
                                    }
                                    .into_any()
                                } else if renaming.get().is_some_and(|r| r.id == folder.id) {
                                    let commit_key = commit.clone();
                                    let folder_key = folder.clone();
                                    let folder_blur = folder.clone();
                                    view! {
                                        <div class="folder-card renaming">
                                            <input
                                                type="text"
                                                class="rename-input"
                                                autofocus=true
                                                prop:value=folder.name.clone()
                                                on:keydown=move |ev: web_sys::KeyboardEvent| {
                                                    match ev.key().as_str() {
                                                        "Enter" => {
                                                            ev.prevent_default();
                                                            commit_key(folder_key.clone(), event_target_value(&ev));
                                                        }
                                                        "Escape" => set_renaming.set(None),
                                                        _ => {}
                                                    }
                                                }
                                                on:blur=move |ev| {
                                                    commit(folder_blur.clone(), event_target_value(&ev))
                                                }
                                            />
                                        </div>
                                    }
                                    .into_any()
                                } else {
                                    let pending = folder.pending;
                                    let menu_folder = folder.clone();
                                    let card_class = if pending {
                                        "folder-card pending"
                                    } else {
                                        "folder-card"
                                    };
                                    view! {
                                        <div
                                            class=card_class
                                            on:contextmenu=move |ev| {
                                                ev.prevent_default();
                                                ev.stop_propagation();
                                                if !pending {
                                                    set_menu.set(Some((
                                                        ev.client_x() as f64,
                                                        ev.client_y() as f64,
                                                        menu_folder.clone(),
                                                    )));
                                                }
                                            }
                                        >
                                            <span class="card-glyph">{folder.kind.glyph()}</span>
                                            <span class="card-name">{folder.name.clone()}</span>
                                            <span class="card-kind">{folder.kind.label()}</span>
                                        </div>
                                    }
                                    .into_any()
                                }
                            }}
                        }
                    }
                />
            </div>

            <Show when=move || folders.get().is_empty()>
                <div class="empty-archive">
                    <h3>"Empty Archive"</h3>
                    <p>"Create the first folder to start building this world."</p>
                </div>
            </Show>

            // Context menu
            {move || menu.get().map(|(x, y, folder)| {
                let ctx = ctx_menu.clone();
                let rename_folder = folder.clone();
                let delete_ctx = ctx.clone();
                let delete_folder = folder.clone();
                let delete_action = Callback::new(move |_: ()| {
                    set_menu.set(None);
                    let ctx = delete_ctx.clone();
                    let folder = delete_folder.clone();
                    spawn_local(async move {
                        if let Err(err) = ctx.sync.delete_folder(&folder).await {
                            web_sys::console::error_1(
                                &format!("[GRID] Delete folder failed: {}", err).into(),
                            );
                            ctx.alert(&format!("Could not delete \"{}\": {}", folder.name, err));
                        }
                    });
                });
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
                        <div class="menu-title">{folder.name.clone()}</div>
                        <button class="menu-item" on:click=move |_| {
                            set_menu.set(None);
                            set_renaming.set(Some(rename_folder.clone()));
                        }>"✏️ Rename"</button>
                        <div class="menu-separator"></div>
                        <div class="menu-item destructive">
                            "Delete Folder "
                            <DeleteConfirmButton
                                button_class="delete-btn"
                                on_confirm=delete_action
                            />
                        </div>
                    </div>
                }
            })}

            <CreateFolderModal open=modal_open set_open=set_modal_open />
        </div>
    }
}
