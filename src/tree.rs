//! Tree Reconciliation
//!
//! Pure helpers that apply a tree message to a component's owned folder and
//! entity slices. Every consumer (tree nodes and the root-level views) runs
//! the same logic over its own copies; nothing here touches signals or the
//! network.

use crate::bus::{NodeKind, NodePayload, TreeMessageKind};
use crate::models::{EntityNode, FolderNode};

/// Apply one message to a folder slice. Payloads addressed to the entity
/// collection are ignored. `Invalidate` is not handled here; callers refetch
/// instead (see [`wants_refetch`]).
pub fn apply_to_folders(kind: &TreeMessageKind, folders: &mut Vec<FolderNode>) {
    match kind {
        TreeMessageKind::OptimisticInsert {
            node: NodePayload::Folder(node),
        } => {
            // Upsert: a redelivered insert must not duplicate the node
            folders.retain(|f| f.id != node.id);
            folders.push(node.clone());
        }
        TreeMessageKind::Confirm {
            old_id,
            node: NodePayload::Folder(node),
        } => {
            // Replace in place; a confirm for an id we no longer hold is a
            // no-op, not an error (the delete won)
            if let Some(slot) = folders.iter_mut().find(|f| f.id == *old_id) {
                *slot = node.clone();
            }
        }
        TreeMessageKind::Remove {
            id,
            kind: NodeKind::Folder,
        } => {
            folders.retain(|f| f.id != *id);
        }
        _ => {}
    }
}

/// Apply one message to an entity slice. Folder payloads are ignored.
pub fn apply_to_entities(kind: &TreeMessageKind, entities: &mut Vec<EntityNode>) {
    match kind {
        TreeMessageKind::OptimisticInsert {
            node: NodePayload::Entity(node),
        } => {
            entities.retain(|e| e.id != node.id);
            entities.push(node.clone());
        }
        TreeMessageKind::Confirm {
            old_id,
            node: NodePayload::Entity(node),
        } => {
            if let Some(slot) = entities.iter_mut().find(|e| e.id == *old_id) {
                *slot = node.clone();
            }
        }
        TreeMessageKind::Remove {
            id,
            kind: NodeKind::Entity,
        } => {
            entities.retain(|e| e.id != *id);
        }
        TreeMessageKind::MoveOut { entity_id } => {
            entities.retain(|e| e.id != *entity_id);
        }
        TreeMessageKind::MoveIn { entity } => {
            entities.retain(|e| e.id != entity.id);
            entities.push(entity.clone());
        }
        _ => {}
    }
}

/// Whether this message asks the consumer to throw away its copy and refetch
pub fn wants_refetch(kind: &TreeMessageKind) -> bool {
    matches!(kind, TreeMessageKind::Invalidate)
}
