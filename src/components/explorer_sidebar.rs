//! Explorer Sidebar
//!
//! Left-hand root registry: holds its own copy of the root folder list,
//! filters it with the search box, starts quick inline folder drafts, and
//! renders the recursive tree below.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::bus::NodeKind;
use crate::components::{use_root_folders, DraftNameInput, FolderTreeNode};
use crate::context::BibleContext;
use crate::models::{FolderKind, Scope};

#[component]
pub fn ExplorerSidebar() -> impl IntoView {
    let ctx = use_context::<BibleContext>().expect("BibleContext should be provided");
    let folders = use_root_folders("EXPLORER");

    let (search, set_search) = signal(String::new());
    // Temp ids of drafts started here; only these render editable
    let (own_drafts, set_own_drafts) = signal(Vec::<String>::new());

    let filtered = move || {
        let query = search.get().trim().to_lowercase();
        folders
            .get()
            .into_iter()
            .filter(|f| query.is_empty() || f.draft || f.name.to_lowercase().contains(&query))
            .collect::<Vec<_>>()
    };

    let start_draft = {
        let sync = ctx.sync.clone();
        move |_| {
            let temp_id = sync.begin_folder_draft(&Scope::Root, FolderKind::Folder);
            set_own_drafts.update(|d| d.push(temp_id));
        }
    };

    view! {
        <aside class="explorer-sidebar">
            <div class="sidebar-header">
                <input
                    type="text"
                    class="search-input"
                    placeholder="Search the bible..."
                    prop:value=move || search.get()
                    on:input=move |ev| set_search.set(event_target_value(&ev))
                />
                <div class="sidebar-title-row">
                    <h2>"Explorer"</h2>
                    <button class="add-folder-btn" on:click=start_draft title="New Folder">
                        "+"
                    </button>
                </div>
            </div>

            <div class="tree-content">
                <For
                    each=filtered
                    key=|f| (f.id.clone(), f.name.clone(), f.pending, f.draft)
                    children=move |folder| {
                        if folder.draft {
                            if own_drafts.get_untracked().contains(&folder.id) {
                                let ctx = use_context::<BibleContext>()
                                    .expect("BibleContext should be provided");
                                let temp_id = folder.id.clone();
                                let kind = folder.kind;
                                let cancel_ctx = ctx.clone();
                                let cancel_temp = folder.id.clone();
                                view! {
                                    <DraftNameInput
                                        placeholder="Folder name..."
                                        on_commit=Callback::new(move |name: String| {
                                            let ctx = ctx.clone();
                                            let temp_id = temp_id.clone();
                                            spawn_local(async move {
                                                if let Err(err) = ctx
                                                    .sync
                                                    .commit_folder_draft(&temp_id, &name, &Scope::Root, kind)
                                                    .await
                                                {
                                                    web_sys::console::error_1(
                                                        &format!("[EXPLORER] Create folder failed: {}", err)
                                                            .into(),
                                                    );
                                                    ctx.show_notice(format!("Could not create folder: {}", err));
                                                }
                                            });
                                        })
                                        on_cancel=Callback::new(move |_: ()| {
                                            cancel_ctx.sync.cancel_draft(
                                                &cancel_temp,
                                                &Scope::Root,
                                                NodeKind::Folder,
                                            );
                                        })
                                    />
                                }
                                .into_any()
                            } else {
                                view! {
                                    <div class="tree-folder-row pending draft">
                                        <span class="folder-glyph">{folder.kind.glyph()}</span>
                                        <span class="folder-name">"…"</span>
                                    </div>
                                }
                                .into_any()
                            }
                        } else {
                            view! { <FolderTreeNode folder=folder depth=0 /> }.into_any()
                        }
                    }
                />

                <Show when=move || folders.get().is_empty()>
                    <div class="empty-root">"Empty Bible"</div>
                </Show>
            </div>
        </aside>
    }
}
