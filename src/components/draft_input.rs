//! Draft Name Input
//!
//! Autofocused input for a node in its "being named" state. Enter or blur
//! commits the typed name; Escape cancels. Committing an empty value is
//! resolved upstream as an implicit cancel.

use leptos::prelude::*;

#[component]
pub fn DraftNameInput(
    #[prop(into)] placeholder: String,
    #[prop(into)] on_commit: Callback<String>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    view! {
        <input
            type="text"
            class="draft-name-input"
            autofocus=true
            placeholder=placeholder
            on:click=|ev| ev.stop_propagation()
            on:keydown=move |ev: web_sys::KeyboardEvent| {
                match ev.key().as_str() {
                    "Enter" => {
                        ev.prevent_default();
                        on_commit.run(event_target_value(&ev));
                    }
                    "Escape" => {
                        ev.prevent_default();
                        on_cancel.run(());
                    }
                    _ => {}
                }
            }
            on:blur=move |ev| on_commit.run(event_target_value(&ev))
        />
    }
}
