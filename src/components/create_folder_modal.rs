//! Create Folder Modal
//!
//! Typed folder creation at the root level: name plus hierarchy kind.
//! Closes as soon as the optimistic create is issued; a rejected create
//! rolls itself back and surfaces a notice.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::KindSelector;
use crate::context::BibleContext;
use crate::models::{FolderKind, Scope};

#[component]
pub fn CreateFolderModal(
    open: ReadSignal<bool>,
    set_open: WriteSignal<bool>,
) -> impl IntoView {
    let ctx = use_context::<BibleContext>().expect("BibleContext should be provided");

    let (name, set_name) = signal(String::new());
    let (kind, set_kind) = signal(FolderKind::Folder);

    view! {
        {move || open.get().then(|| {
            let ctx = ctx.clone();
            let submit = move |ev: web_sys::SubmitEvent| {
                ev.prevent_default();
                let value = name.get().trim().to_string();
                if value.is_empty() {
                    return;
                }
                let chosen = kind.get();
                set_open.set(false);
                set_name.set(String::new());
                set_kind.set(FolderKind::Folder);
                let ctx = ctx.clone();
                spawn_local(async move {
                    if let Err(err) = ctx.sync.create_folder(&value, &Scope::Root, chosen).await {
                        web_sys::console::error_1(
                            &format!("[MODAL] Create folder failed: {}", err).into(),
                        );
                        ctx.show_notice(format!("Could not create \"{}\": {}", value, err));
                    }
                });
            };
            view! {
                <div class="modal-overlay" on:click=move |_| set_open.set(false)></div>
                <div class="modal">
                    <h3>"New Folder"</h3>
                    <form on:submit=submit>
                        <input
                            type="text"
                            class="modal-name-input"
                            autofocus=true
                            placeholder="Name..."
                            prop:value=move || name.get()
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                        />
                        <KindSelector
                            current_kind=kind
                            on_change=move |k| set_kind.set(k)
                        />
                        <div class="modal-actions">
                            <button
                                type="button"
                                class="cancel-btn"
                                on:click=move |_| set_open.set(false)
                            >
                                "Cancel"
                            </button>
                            <button type="submit" class="primary-btn">"Create"</button>
                        </div>
                    </form>
                </div>
            }
        })}
    }
}
