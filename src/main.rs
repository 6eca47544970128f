#![allow(warnings)]
//! World Bible Frontend Entry Point

mod api;
mod app;
mod bus;
mod components;
mod context;
mod models;
mod sync;
mod tree;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
