//! Global Right Panel
//!
//! Independent side-panel registry: a compact world-bible tree over its own
//! copy of the root folder list. Never inherits state from the explorer or
//! the grid; a mutation made anywhere reaches it through the bus alone.

use leptos::prelude::*;

use crate::bus::{TreeMessage, TreeMessageKind};
use crate::components::{use_root_folders, FolderTreeNode};
use crate::context::BibleContext;
use crate::models::Scope;

#[component]
pub fn GlobalPanel() -> impl IntoView {
    let ctx = use_context::<BibleContext>().expect("BibleContext should be provided");
    let folders = use_root_folders("PANEL");

    // A root-scoped invalidate makes every mounted root view refetch
    let refresh = {
        let bus = ctx.bus.clone();
        move |_| {
            bus.publish(TreeMessage {
                scope: Scope::Root,
                kind: TreeMessageKind::Invalidate,
            });
        }
    };

    view! {
        <aside class="global-panel">
            <div class="panel-header">
                <h2>"World Bible"</h2>
                <button class="refresh-btn" on:click=refresh title="Refresh">
                    "↻"
                </button>
            </div>

            <div class="panel-tree">
                <For
                    each=move || folders.get()
                    key=|f| (f.id.clone(), f.name.clone(), f.pending, f.draft)
                    children=move |folder| {
                        if folder.draft {
                            // Drafts are only editable where they started
                            view! {
                                <div class="tree-folder-row pending draft">
                                    <span class="folder-glyph">{folder.kind.glyph()}</span>
                                    <span class="folder-name">"…"</span>
                                </div>
                            }
                            .into_any()
                        } else {
                            view! { <FolderTreeNode folder=folder depth=0 /> }.into_any()
                        }
                    }
                />

                <Show when=move || folders.get().is_empty()>
                    <div class="empty-root">"Nothing here yet"</div>
                </Show>
            </div>
        </aside>
    }
}
