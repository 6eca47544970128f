//! Frontend Models
//!
//! Folder/entity node structures matching the world-bible backend, plus the
//! scope type used to address tree messages.

use serde::{Deserialize, Serialize};

/// Addressing for tree messages and child listings: either the synthetic
/// root level or a concrete folder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Root,
    Folder(String),
}

impl Scope {
    pub fn for_parent(parent_id: Option<&str>) -> Self {
        match parent_id {
            Some(id) => Scope::Folder(id.to_string()),
            None => Scope::Root,
        }
    }

    /// The folder id this scope names, if any
    pub fn folder_id(&self) -> Option<&str> {
        match self {
            Scope::Root => None,
            Scope::Folder(id) => Some(id.as_str()),
        }
    }
}

/// Hierarchy type tag carried by every folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FolderKind {
    Folder,
    Universe,
    Galaxy,
    System,
    Planet,
}

impl FolderKind {
    pub const ALL: &'static [FolderKind] = &[
        FolderKind::Folder,
        FolderKind::Universe,
        FolderKind::Galaxy,
        FolderKind::System,
        FolderKind::Planet,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FolderKind::Folder => "Folder",
            FolderKind::Universe => "Universe",
            FolderKind::Galaxy => "Galaxy",
            FolderKind::System => "Solar System",
            FolderKind::Planet => "Planet",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            FolderKind::Folder => "📁",
            FolderKind::Universe => "🌌",
            FolderKind::Galaxy => "✨",
            FolderKind::System => "☀️",
            FolderKind::Planet => "🪐",
        }
    }
}

impl Default for FolderKind {
    fn default() -> Self {
        FolderKind::Folder
    }
}

/// One folder in the hierarchy.
///
/// `id` is canonical as a string for both server ids and locally generated
/// temporary ids; `pending` is true exactly while a temporary id is
/// outstanding. `draft` marks an inline create whose name has not been
/// committed yet; it never leaves the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: FolderKind,
    #[serde(rename = "parentId")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub children_loaded: bool,
    #[serde(default)]
    pub pending: bool,
    #[serde(skip)]
    pub draft: bool,
}

impl FolderNode {
    /// Scope of the collection this folder lives in
    pub fn parent_scope(&self) -> Scope {
        Scope::for_parent(self.parent_id.as_deref())
    }
}

/// Entity type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Character,
    Location,
    Culture,
    Map,
    Timeline,
    Glyph,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Character => "Character",
            EntityKind::Location => "Location",
            EntityKind::Culture => "Culture",
            EntityKind::Map => "Map",
            EntityKind::Timeline => "Timeline",
            EntityKind::Glyph => "Glyph",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            EntityKind::Character => "👤",
            EntityKind::Location => "📍",
            EntityKind::Culture => "👥",
            EntityKind::Map => "🗺️",
            EntityKind::Timeline => "📜",
            EntityKind::Glyph => "✒️",
        }
    }
}

/// One entity record. `folder_id` is the sole parent relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityNode {
    pub id: String,
    pub name: String,
    pub kind: EntityKind,
    #[serde(rename = "folderId")]
    pub folder_id: String,
    #[serde(default)]
    pub pending: bool,
    #[serde(skip)]
    pub draft: bool,
}

impl EntityNode {
    /// Scope of the collection this entity lives in
    pub fn scope(&self) -> Scope {
        Scope::Folder(self.folder_id.clone())
    }
}

/// Partial update for an entity: rename, move, or both
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "folderId", skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
}
