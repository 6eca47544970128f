//! Kind Selector Component
//!
//! Hierarchy-kind picker buttons for typed folder creation.

use leptos::prelude::*;

use crate::models::FolderKind;

/// Kind selector buttons for folders
#[component]
pub fn KindSelector(
    current_kind: ReadSignal<FolderKind>,
    on_change: impl Fn(FolderKind) + Copy + Send + Sync + 'static,
) -> impl IntoView {
    view! {
        <div class="kind-selector">
            {FolderKind::ALL.iter().map(|kind| {
                let kind = *kind;
                let is_selected = move || current_kind.get() == kind;
                view! {
                    <button
                        type="button"
                        class=move || if is_selected() { "kind-btn active" } else { "kind-btn" }
                        on:click=move |_| on_change(kind)
                    >
                        <span class="kind-glyph">{kind.glyph()}</span>
                        " "
                        {kind.label()}
                    </button>
                }
            }).collect_view()}
        </div>
    }
}
