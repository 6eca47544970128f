//! Node Store Adapter
//!
//! REST bindings for the world-bible backend. The [`NodeStore`] trait is the
//! seam the mutation coordinator and tree nodes talk through; [`ApiNodeStore`]
//! is the browser-fetch implementation. Pure I/O, no tree logic.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, RequestInit, Response};

use crate::models::{EntityKind, EntityNode, EntityPatch, FolderKind, FolderNode, Scope};

// ========================
// Request Argument Structs
// ========================

#[derive(Serialize)]
pub struct CreateFolderArgs<'a> {
    pub name: &'a str,
    #[serde(rename = "parentId")]
    pub parent_id: Option<&'a str>,
    pub kind: FolderKind,
}

#[derive(Serialize)]
pub struct CreateEntityArgs<'a> {
    pub name: &'a str,
    #[serde(rename = "folderId")]
    pub folder_id: &'a str,
    pub kind: EntityKind,
}

#[derive(Serialize)]
struct RenameArgs<'a> {
    name: &'a str,
}

// ========================
// Store Boundary
// ========================

/// Backend contract consumed by the coordinator and the tree nodes.
///
/// Every call is assumed to fail atomically: on `Err` the server performed
/// nothing, so the client only ever rolls back locally.
#[allow(async_fn_in_trait)]
pub trait NodeStore {
    async fn list_subfolders(&self, parent: &Scope) -> Result<Vec<FolderNode>, String>;
    async fn list_entities(&self, folder_id: &str) -> Result<Vec<EntityNode>, String>;
    async fn create_folder(&self, args: &CreateFolderArgs<'_>) -> Result<FolderNode, String>;
    async fn rename_folder(&self, id: &str, name: &str) -> Result<(), String>;
    async fn delete_folder(&self, id: &str) -> Result<(), String>;
    async fn create_entity(&self, args: &CreateEntityArgs<'_>) -> Result<EntityNode, String>;
    async fn get_entity(&self, id: &str) -> Result<EntityNode, String>;
    async fn update_entity(&self, id: &str, patch: &EntityPatch) -> Result<(), String>;
    async fn delete_entity(&self, id: &str) -> Result<(), String>;
}

/// Browser-fetch implementation against the REST backend
#[derive(Clone)]
pub struct ApiNodeStore {
    base_url: String,
}

pub const DEFAULT_API_BASE: &str = "/api";

impl ApiNodeStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<Response, String> {
        let url = format!("{}{}", self.base_url, path);

        let opts = RequestInit::new();
        opts.set_method(method);
        let headers = Headers::new().map_err(js_err)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(js_err)?;
        opts.set_headers(&headers);
        if let Some(body) = body {
            opts.set_body(&JsValue::from_str(&body));
        }

        let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
        let resp = JsFuture::from(window.fetch_with_str_and_init(&url, &opts))
            .await
            .map_err(js_err)?;
        let resp: Response = resp.dyn_into().map_err(js_err)?;

        if !resp.ok() {
            return Err(format!("HTTP {} for {} {}", resp.status(), method, url));
        }
        Ok(resp)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<T, String> {
        let resp = self.send(method, path, body).await?;
        let json = JsFuture::from(resp.json().map_err(js_err)?)
            .await
            .map_err(js_err)?;
        serde_wasm_bindgen::from_value(json).map_err(|e| e.to_string())
    }

    /// For endpoints whose success reply carries no body we care about
    async fn fetch_unit(
        &self,
        method: &str,
        path: &str,
        body: Option<String>,
    ) -> Result<(), String> {
        let _ = self.send(method, path, body).await?;
        Ok(())
    }
}

fn js_err(e: impl Into<JsValue>) -> String {
    format!("{:?}", e.into())
}

fn encode_body(value: &impl Serialize) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

impl NodeStore for ApiNodeStore {
    async fn list_subfolders(&self, parent: &Scope) -> Result<Vec<FolderNode>, String> {
        let path = match parent {
            Scope::Root => "/world-bible/folders".to_string(),
            Scope::Folder(id) => format!("/world-bible/folders/{}/subfolders", id),
        };
        self.fetch_json("GET", &path, None).await
    }

    async fn list_entities(&self, folder_id: &str) -> Result<Vec<EntityNode>, String> {
        self.fetch_json(
            "GET",
            &format!("/world-bible/folders/{}/entities", folder_id),
            None,
        )
        .await
    }

    async fn create_folder(&self, args: &CreateFolderArgs<'_>) -> Result<FolderNode, String> {
        self.fetch_json("POST", "/world-bible/folders", Some(encode_body(args)?))
            .await
    }

    async fn rename_folder(&self, id: &str, name: &str) -> Result<(), String> {
        self.fetch_unit(
            "PUT",
            &format!("/world-bible/folders/{}", id),
            Some(encode_body(&RenameArgs { name })?),
        )
        .await
    }

    async fn delete_folder(&self, id: &str) -> Result<(), String> {
        self.fetch_unit("DELETE", &format!("/world-bible/folders/{}", id), None)
            .await
    }

    async fn create_entity(&self, args: &CreateEntityArgs<'_>) -> Result<EntityNode, String> {
        self.fetch_json("POST", "/world-bible/entities", Some(encode_body(args)?))
            .await
    }

    async fn get_entity(&self, id: &str) -> Result<EntityNode, String> {
        self.fetch_json("GET", &format!("/world-bible/entities/{}", id), None)
            .await
    }

    async fn update_entity(&self, id: &str, patch: &EntityPatch) -> Result<(), String> {
        self.fetch_unit(
            "PUT",
            &format!("/world-bible/entities/{}", id),
            Some(encode_body(patch)?),
        )
        .await
    }

    async fn delete_entity(&self, id: &str) -> Result<(), String> {
        self.fetch_unit("DELETE", &format!("/world-bible/entities/{}", id), None)
            .await
    }
}
