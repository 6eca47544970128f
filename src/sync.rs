//! Optimistic Mutation Coordinator
//!
//! The only code that calls the Node Store for folder/entity mutations.
//! Every mutation is locally visible before the network round trip settles:
//! creates publish an optimistic insert first and resolve it with exactly one
//! confirm or rollback once the request completes. Renames, deletes and
//! moves are not optimistic; they publish only after the server accepted
//! them. Callers surface errors; nothing here touches the DOM.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::{CreateEntityArgs, CreateFolderArgs, NodeStore};
use crate::bus::{NodeKind, NodePayload, TreeBus, TreeMessage, TreeMessageKind};
use crate::models::{EntityKind, EntityNode, EntityPatch, FolderKind, FolderNode, Scope};

#[derive(Clone)]
pub struct SyncCoordinator<S> {
    store: S,
    bus: TreeBus,
    temp_seq: Arc<AtomicU64>,
    /// Temporary ids whose create request has been issued (or that were
    /// cancelled). A temp id resolves at most once, so a draft committed
    /// from two places still produces a single create.
    settled: Arc<Mutex<HashSet<String>>>,
}

impl<S: NodeStore + Clone> SyncCoordinator<S> {
    pub fn new(store: S, bus: TreeBus) -> Self {
        Self {
            store,
            bus,
            temp_seq: Arc::new(AtomicU64::new(0)),
            settled: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn bus(&self) -> &TreeBus {
        &self.bus
    }

    fn next_temp_id(&self) -> String {
        let n = self.temp_seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("temp-{}", n)
    }

    /// First commit wins; returns false when the id already resolved
    fn claim(&self, temp_id: &str) -> bool {
        self.settled
            .lock()
            .expect("settled ids lock")
            .insert(temp_id.to_string())
    }

    fn publish(&self, scope: Scope, kind: TreeMessageKind) {
        self.bus.publish(TreeMessage { scope, kind });
    }

    // ========================
    // Folder Mutations
    // ========================

    /// Create a folder with a known name: optimistic insert, then resolve.
    pub async fn create_folder(
        &self,
        name: &str,
        parent: &Scope,
        kind: FolderKind,
    ) -> Result<FolderNode, String> {
        let temp_id = self.next_temp_id();
        self.publish(
            parent.clone(),
            TreeMessageKind::OptimisticInsert {
                node: NodePayload::Folder(FolderNode {
                    id: temp_id.clone(),
                    name: name.to_string(),
                    kind,
                    parent_id: parent.folder_id().map(str::to_string),
                    children_loaded: false,
                    pending: true,
                    draft: false,
                }),
            },
        );
        self.settle_folder_create(temp_id, name, parent, kind).await
    }

    /// Insert a nameless draft folder under `parent`. Purely local; the
    /// network request is issued by [`Self::commit_folder_draft`].
    pub fn begin_folder_draft(&self, parent: &Scope, kind: FolderKind) -> String {
        let temp_id = self.next_temp_id();
        self.publish(
            parent.clone(),
            TreeMessageKind::OptimisticInsert {
                node: NodePayload::Folder(FolderNode {
                    id: temp_id.clone(),
                    name: String::new(),
                    kind,
                    parent_id: parent.folder_id().map(str::to_string),
                    children_loaded: false,
                    pending: true,
                    draft: true,
                }),
            },
        );
        temp_id
    }

    /// Resolve a draft folder with the typed name. An empty name is an
    /// implicit cancel, not an error; `Ok(None)` means nothing was created.
    pub async fn commit_folder_draft(
        &self,
        temp_id: &str,
        name: &str,
        parent: &Scope,
        kind: FolderKind,
    ) -> Result<Option<FolderNode>, String> {
        if !self.claim(temp_id) {
            return Ok(None);
        }
        let name = name.trim();
        if name.is_empty() {
            self.publish(
                parent.clone(),
                TreeMessageKind::Remove {
                    id: temp_id.to_string(),
                    kind: NodeKind::Folder,
                },
            );
            return Ok(None);
        }
        self.settle_folder_create(temp_id.to_string(), name, parent, kind)
            .await
            .map(Some)
    }

    async fn settle_folder_create(
        &self,
        temp_id: String,
        name: &str,
        parent: &Scope,
        kind: FolderKind,
    ) -> Result<FolderNode, String> {
        let args = CreateFolderArgs {
            name,
            parent_id: parent.folder_id(),
            kind,
        };
        match self.store.create_folder(&args).await {
            Ok(created) => {
                self.publish(
                    parent.clone(),
                    TreeMessageKind::Confirm {
                        old_id: temp_id,
                        node: NodePayload::Folder(created.clone()),
                    },
                );
                Ok(created)
            }
            Err(err) => {
                self.publish(
                    parent.clone(),
                    TreeMessageKind::Remove {
                        id: temp_id,
                        kind: NodeKind::Folder,
                    },
                );
                Err(err)
            }
        }
    }

    /// Renames apply only to confirmed folders and are not optimistic; the
    /// settled name is propagated as an id-keyed replacement.
    pub async fn rename_folder(&self, folder: &FolderNode, new_name: &str) -> Result<(), String> {
        if folder.pending {
            return Err("folder is not confirmed yet".to_string());
        }
        self.store.rename_folder(&folder.id, new_name).await?;
        let renamed = FolderNode {
            name: new_name.to_string(),
            ..folder.clone()
        };
        self.publish(
            folder.parent_scope(),
            TreeMessageKind::Confirm {
                old_id: folder.id.clone(),
                node: NodePayload::Folder(renamed),
            },
        );
        Ok(())
    }

    /// Deletion is not optimistic: the removal message is published only
    /// after the server accepted it, so a failure leaves the item in place.
    pub async fn delete_folder(&self, folder: &FolderNode) -> Result<(), String> {
        if folder.pending {
            return Err("folder is not confirmed yet".to_string());
        }
        self.store.delete_folder(&folder.id).await?;
        self.publish(
            folder.parent_scope(),
            TreeMessageKind::Remove {
                id: folder.id.clone(),
                kind: NodeKind::Folder,
            },
        );
        Ok(())
    }

    // ========================
    // Entity Mutations
    // ========================

    pub async fn create_entity(
        &self,
        name: &str,
        folder_id: &str,
        kind: EntityKind,
    ) -> Result<EntityNode, String> {
        let temp_id = self.next_temp_id();
        self.publish(
            Scope::Folder(folder_id.to_string()),
            TreeMessageKind::OptimisticInsert {
                node: NodePayload::Entity(EntityNode {
                    id: temp_id.clone(),
                    name: name.to_string(),
                    kind,
                    folder_id: folder_id.to_string(),
                    pending: true,
                    draft: false,
                }),
            },
        );
        self.settle_entity_create(temp_id, name, folder_id, kind)
            .await
    }

    pub fn begin_entity_draft(&self, folder_id: &str, kind: EntityKind) -> String {
        let temp_id = self.next_temp_id();
        self.publish(
            Scope::Folder(folder_id.to_string()),
            TreeMessageKind::OptimisticInsert {
                node: NodePayload::Entity(EntityNode {
                    id: temp_id.clone(),
                    name: String::new(),
                    kind,
                    folder_id: folder_id.to_string(),
                    pending: true,
                    draft: true,
                }),
            },
        );
        temp_id
    }

    pub async fn commit_entity_draft(
        &self,
        temp_id: &str,
        name: &str,
        folder_id: &str,
        kind: EntityKind,
    ) -> Result<Option<EntityNode>, String> {
        if !self.claim(temp_id) {
            return Ok(None);
        }
        let name = name.trim();
        if name.is_empty() {
            self.publish(
                Scope::Folder(folder_id.to_string()),
                TreeMessageKind::Remove {
                    id: temp_id.to_string(),
                    kind: NodeKind::Entity,
                },
            );
            return Ok(None);
        }
        self.settle_entity_create(temp_id.to_string(), name, folder_id, kind)
            .await
            .map(Some)
    }

    async fn settle_entity_create(
        &self,
        temp_id: String,
        name: &str,
        folder_id: &str,
        kind: EntityKind,
    ) -> Result<EntityNode, String> {
        let args = CreateEntityArgs {
            name,
            folder_id,
            kind,
        };
        let scope = Scope::Folder(folder_id.to_string());
        match self.store.create_entity(&args).await {
            Ok(created) => {
                self.publish(
                    scope,
                    TreeMessageKind::Confirm {
                        old_id: temp_id,
                        node: NodePayload::Entity(created.clone()),
                    },
                );
                Ok(created)
            }
            Err(err) => {
                self.publish(
                    scope,
                    TreeMessageKind::Remove {
                        id: temp_id,
                        kind: NodeKind::Entity,
                    },
                );
                Err(err)
            }
        }
    }

    /// Cancel a never-committed draft (empty blur or Escape)
    pub fn cancel_draft(&self, temp_id: &str, scope: &Scope, kind: NodeKind) {
        if !self.claim(temp_id) {
            return;
        }
        self.publish(
            scope.clone(),
            TreeMessageKind::Remove {
                id: temp_id.to_string(),
                kind,
            },
        );
    }

    pub async fn rename_entity(&self, entity: &EntityNode, new_name: &str) -> Result<(), String> {
        if entity.pending {
            return Err("entity is not confirmed yet".to_string());
        }
        let patch = EntityPatch {
            name: Some(new_name.to_string()),
            folder_id: None,
        };
        self.store.update_entity(&entity.id, &patch).await?;
        let renamed = EntityNode {
            name: new_name.to_string(),
            ..entity.clone()
        };
        self.publish(
            entity.scope(),
            TreeMessageKind::Confirm {
                old_id: entity.id.clone(),
                node: NodePayload::Entity(renamed),
            },
        );
        Ok(())
    }

    pub async fn delete_entity(&self, entity: &EntityNode) -> Result<(), String> {
        if entity.pending {
            return Err("entity is not confirmed yet".to_string());
        }
        self.store.delete_entity(&entity.id).await?;
        self.publish(
            entity.scope(),
            TreeMessageKind::Remove {
                id: entity.id.clone(),
                kind: NodeKind::Entity,
            },
        );
        Ok(())
    }

    /// Reparent an entity. On success both halves of the move are published
    /// back to back, one to each scope, so exactly one tree loses the item
    /// and exactly one gains it. A failed move publishes nothing.
    pub async fn move_entity(
        &self,
        entity: &EntityNode,
        target_folder_id: &str,
    ) -> Result<(), String> {
        if entity.pending {
            return Err("entity is not confirmed yet".to_string());
        }
        if entity.folder_id == target_folder_id {
            return Ok(());
        }
        let patch = EntityPatch {
            name: None,
            folder_id: Some(target_folder_id.to_string()),
        };
        self.store.update_entity(&entity.id, &patch).await?;
        let moved = EntityNode {
            folder_id: target_folder_id.to_string(),
            ..entity.clone()
        };
        self.publish(
            entity.scope(),
            TreeMessageKind::MoveOut {
                entity_id: entity.id.clone(),
            },
        );
        self.publish(
            Scope::Folder(target_folder_id.to_string()),
            TreeMessageKind::MoveIn { entity: moved },
        );
        Ok(())
    }

    /// Fetch the full source record, then create the copy through the
    /// ordinary optimistic create path.
    pub async fn duplicate_entity(&self, source_id: &str) -> Result<EntityNode, String> {
        let source = self.store.get_entity(source_id).await?;
        self.create_entity(
            &format!("{} (copy)", source.name),
            &source.folder_id,
            source.kind,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{apply_to_entities, apply_to_folders};

    // ========================
    // In-memory Node Store
    // ========================

    #[derive(Default)]
    struct MockInner {
        next_id: u64,
        folders: Vec<FolderNode>,
        entities: Vec<EntityNode>,
        create_calls: u32,
        fail_create: bool,
        fail_update: bool,
        fail_delete: bool,
    }

    #[derive(Clone, Default)]
    struct MockStore {
        inner: Arc<Mutex<MockInner>>,
    }

    impl MockStore {
        fn with_inner<T>(&self, f: impl FnOnce(&mut MockInner) -> T) -> T {
            f(&mut self.inner.lock().expect("mock store lock"))
        }

        fn set_fail_create(&self, fail: bool) {
            self.with_inner(|i| i.fail_create = fail);
        }

        fn set_fail_update(&self, fail: bool) {
            self.with_inner(|i| i.fail_update = fail);
        }

        fn set_fail_delete(&self, fail: bool) {
            self.with_inner(|i| i.fail_delete = fail);
        }

        fn create_calls(&self) -> u32 {
            self.with_inner(|i| i.create_calls)
        }
    }

    impl NodeStore for MockStore {
        async fn list_subfolders(&self, parent: &Scope) -> Result<Vec<FolderNode>, String> {
            let want = parent.folder_id().map(str::to_string);
            Ok(self.with_inner(|i| {
                i.folders
                    .iter()
                    .filter(|f| f.parent_id == want)
                    .cloned()
                    .collect()
            }))
        }

        async fn list_entities(&self, folder_id: &str) -> Result<Vec<EntityNode>, String> {
            Ok(self.with_inner(|i| {
                i.entities
                    .iter()
                    .filter(|e| e.folder_id == folder_id)
                    .cloned()
                    .collect()
            }))
        }

        async fn create_folder(&self, args: &CreateFolderArgs<'_>) -> Result<FolderNode, String> {
            self.with_inner(|i| {
                i.create_calls += 1;
                if i.fail_create {
                    return Err("server rejected create".to_string());
                }
                i.next_id += 1;
                let folder = FolderNode {
                    id: i.next_id.to_string(),
                    name: args.name.to_string(),
                    kind: args.kind,
                    parent_id: args.parent_id.map(str::to_string),
                    children_loaded: false,
                    pending: false,
                    draft: false,
                };
                i.folders.push(folder.clone());
                Ok(folder)
            })
        }

        async fn rename_folder(&self, id: &str, name: &str) -> Result<(), String> {
            self.with_inner(|i| {
                if i.fail_update {
                    return Err("server rejected rename".to_string());
                }
                match i.folders.iter_mut().find(|f| f.id == id) {
                    Some(f) => {
                        f.name = name.to_string();
                        Ok(())
                    }
                    None => Err("no such folder".to_string()),
                }
            })
        }

        async fn delete_folder(&self, id: &str) -> Result<(), String> {
            self.with_inner(|i| {
                if i.fail_delete {
                    return Err("server rejected delete".to_string());
                }
                i.folders.retain(|f| f.id != id);
                Ok(())
            })
        }

        async fn create_entity(&self, args: &CreateEntityArgs<'_>) -> Result<EntityNode, String> {
            self.with_inner(|i| {
                i.create_calls += 1;
                if i.fail_create {
                    return Err("server rejected create".to_string());
                }
                i.next_id += 1;
                let entity = EntityNode {
                    id: i.next_id.to_string(),
                    name: args.name.to_string(),
                    kind: args.kind,
                    folder_id: args.folder_id.to_string(),
                    pending: false,
                    draft: false,
                };
                i.entities.push(entity.clone());
                Ok(entity)
            })
        }

        async fn get_entity(&self, id: &str) -> Result<EntityNode, String> {
            self.with_inner(|i| {
                i.entities
                    .iter()
                    .find(|e| e.id == id)
                    .cloned()
                    .ok_or_else(|| "no such entity".to_string())
            })
        }

        async fn update_entity(&self, id: &str, patch: &EntityPatch) -> Result<(), String> {
            self.with_inner(|i| {
                if i.fail_update {
                    return Err("server rejected update".to_string());
                }
                match i.entities.iter_mut().find(|e| e.id == id) {
                    Some(e) => {
                        if let Some(name) = &patch.name {
                            e.name = name.clone();
                        }
                        if let Some(folder_id) = &patch.folder_id {
                            e.folder_id = folder_id.clone();
                        }
                        Ok(())
                    }
                    None => Err("no such entity".to_string()),
                }
            })
        }

        async fn delete_entity(&self, id: &str) -> Result<(), String> {
            self.with_inner(|i| {
                if i.fail_delete {
                    return Err("server rejected delete".to_string());
                }
                i.entities.retain(|e| e.id != id);
                Ok(())
            })
        }
    }

    // ========================
    // Fake mounted consumers
    // ========================

    /// Stand-in for a root-level view: an owned folder slice reconciled
    /// through the same apply function the components use.
    fn mount_folder_view(bus: &TreeBus, scope: Scope) -> Arc<Mutex<Vec<FolderNode>>> {
        let slice = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&slice);
        bus.subscribe(scope, move |msg| {
            apply_to_folders(&msg.kind, &mut s.lock().expect("view lock"));
        });
        slice
    }

    /// Stand-in for one tree node's entity list
    fn mount_entity_view(bus: &TreeBus, folder_id: &str) -> Arc<Mutex<Vec<EntityNode>>> {
        let slice = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&slice);
        bus.subscribe(Scope::Folder(folder_id.to_string()), move |msg| {
            apply_to_entities(&msg.kind, &mut s.lock().expect("view lock"));
        });
        slice
    }

    fn mount_recorder(bus: &TreeBus, scope: Scope) -> Arc<Mutex<Vec<TreeMessageKind>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let l = Arc::clone(&log);
        bus.subscribe(scope, move |msg| {
            l.lock().expect("recorder lock").push(msg.kind.clone())
        });
        log
    }

    fn setup() -> (SyncCoordinator<MockStore>, MockStore, TreeBus) {
        let store = MockStore::default();
        let bus = TreeBus::new();
        let sync = SyncCoordinator::new(store.clone(), bus.clone());
        (sync, store, bus)
    }

    fn root_folder(id: &str, name: &str) -> FolderNode {
        FolderNode {
            id: id.to_string(),
            name: name.to_string(),
            kind: FolderKind::Folder,
            parent_id: None,
            children_loaded: false,
            pending: false,
            draft: false,
        }
    }

    async fn seed_entity(store: &MockStore, folder_id: &str) -> EntityNode {
        store
            .create_entity(&CreateEntityArgs {
                name: "Hero",
                folder_id,
                kind: EntityKind::Character,
            })
            .await
            .expect("Failed to seed entity")
    }

    async fn seed_folder(store: &MockStore, name: &str) -> FolderNode {
        store
            .create_folder(&CreateFolderArgs {
                name,
                parent_id: None,
                kind: FolderKind::Folder,
            })
            .await
            .expect("Failed to seed folder")
    }

    // ========================
    // Tests
    // ========================

    #[tokio::test]
    async fn test_create_folder_inserts_before_confirming() {
        let (sync, _store, bus) = setup();
        let log = mount_recorder(&bus, Scope::Root);
        let view = mount_folder_view(&bus, Scope::Root);

        let created = sync
            .create_folder("Atlas", &Scope::Root, FolderKind::Universe)
            .await
            .expect("Failed to create folder");

        let log = log.lock().expect("lock");
        assert_eq!(log.len(), 2);
        match &log[0] {
            TreeMessageKind::OptimisticInsert {
                node: NodePayload::Folder(f),
            } => {
                assert!(f.pending);
                assert!(f.id.starts_with("temp-"));
                assert_eq!(f.name, "Atlas");
            }
            other => panic!("expected optimistic insert, got {:?}", other),
        }
        match &log[1] {
            TreeMessageKind::Confirm { old_id, node } => {
                assert!(old_id.starts_with("temp-"));
                assert_eq!(node.id(), created.id);
            }
            other => panic!("expected confirm, got {:?}", other),
        }

        let view = view.lock().expect("lock");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, created.id);
        assert!(!view[0].pending);
    }

    #[tokio::test]
    async fn test_failed_create_rolls_back() {
        let (sync, store, bus) = setup();
        let view = mount_folder_view(&bus, Scope::Root);
        view.lock()
            .expect("lock")
            .push(root_folder("1", "Existing"));
        let before = view.lock().expect("lock").clone();

        store.set_fail_create(true);
        let result = sync
            .create_folder("Doomed", &Scope::Root, FolderKind::Folder)
            .await;

        assert!(result.is_err());
        assert_eq!(*view.lock().expect("lock"), before);
    }

    #[tokio::test]
    async fn test_draft_commit_resolves_once() {
        let (sync, store, bus) = setup();
        let view = mount_folder_view(&bus, Scope::Root);

        let temp_id = sync.begin_folder_draft(&Scope::Root, FolderKind::Folder);
        assert!(view.lock().expect("lock")[0].draft);

        let first = sync
            .commit_folder_draft(&temp_id, "Atlas", &Scope::Root, FolderKind::Folder)
            .await
            .expect("Failed to commit draft");
        assert!(first.is_some());

        // Enter followed by blur commits twice; the second must be inert
        let second = sync
            .commit_folder_draft(&temp_id, "Atlas", &Scope::Root, FolderKind::Folder)
            .await
            .expect("Second commit should be a no-op");
        assert!(second.is_none());
        assert_eq!(store.create_calls(), 1);

        let view = view.lock().expect("lock");
        assert_eq!(view.len(), 1);
        assert!(!view[0].pending);
        assert_eq!(view[0].name, "Atlas");
    }

    #[tokio::test]
    async fn test_empty_name_commit_cancels() {
        let (sync, store, bus) = setup();
        let view = mount_folder_view(&bus, Scope::Root);

        let temp_id = sync.begin_folder_draft(&Scope::Root, FolderKind::Folder);
        let result = sync
            .commit_folder_draft(&temp_id, "   ", &Scope::Root, FolderKind::Folder)
            .await
            .expect("Empty commit should cancel");

        assert!(result.is_none());
        assert!(view.lock().expect("lock").is_empty());
        assert_eq!(store.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_draft_removes_provisional_node() {
        let (sync, _store, bus) = setup();
        let view = mount_entity_view(&bus, "3");

        let temp_id = sync.begin_entity_draft("3", EntityKind::Character);
        assert_eq!(view.lock().expect("lock").len(), 1);

        sync.cancel_draft(&temp_id, &Scope::Folder("3".to_string()), NodeKind::Entity);
        assert!(view.lock().expect("lock").is_empty());

        // Cancelling again changes nothing
        sync.cancel_draft(&temp_id, &Scope::Folder("3".to_string()), NodeKind::Entity);
        assert!(view.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_not_optimistic() {
        let (sync, store, bus) = setup();
        let folder = seed_folder(&store, "Keep").await;

        let view = mount_folder_view(&bus, Scope::Root);
        view.lock().expect("lock").push(folder.clone());

        store.set_fail_delete(true);
        assert!(sync.delete_folder(&folder).await.is_err());
        // Nothing was published; the item never flickered away
        assert_eq!(view.lock().expect("lock").len(), 1);

        store.set_fail_delete(false);
        sync.delete_folder(&folder)
            .await
            .expect("Failed to delete folder");
        assert!(view.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_rename_patches_in_place() {
        let (sync, store, bus) = setup();
        let folder = seed_folder(&store, "Old").await;

        let view = mount_folder_view(&bus, Scope::Root);
        view.lock().expect("lock").push(folder.clone());

        sync.rename_folder(&folder, "New")
            .await
            .expect("Failed to rename");

        let view = view.lock().expect("lock");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, folder.id);
        assert_eq!(view[0].name, "New");
    }

    #[tokio::test]
    async fn test_failed_rename_keeps_previous_name() {
        let (sync, store, bus) = setup();
        let folder = seed_folder(&store, "Old").await;

        let view = mount_folder_view(&bus, Scope::Root);
        view.lock().expect("lock").push(folder.clone());

        store.set_fail_update(true);
        assert!(sync.rename_folder(&folder, "New").await.is_err());
        assert_eq!(view.lock().expect("lock")[0].name, "Old");
    }

    #[tokio::test]
    async fn test_move_lands_in_exactly_one_folder() {
        let (sync, store, bus) = setup();
        let entity = seed_entity(&store, "3").await;

        let source = mount_entity_view(&bus, "3");
        let dest = mount_entity_view(&bus, "9");
        source.lock().expect("lock").push(entity.clone());

        sync.move_entity(&entity, "9")
            .await
            .expect("Failed to move entity");

        assert!(source.lock().expect("lock").is_empty());
        let dest = dest.lock().expect("lock");
        assert_eq!(dest.len(), 1);
        assert_eq!(dest[0].id, entity.id);
        assert_eq!(dest[0].folder_id, "9");
    }

    #[tokio::test]
    async fn test_failed_move_changes_nothing() {
        let (sync, store, bus) = setup();
        let entity = seed_entity(&store, "3").await;

        let source = mount_entity_view(&bus, "3");
        let dest = mount_entity_view(&bus, "9");
        source.lock().expect("lock").push(entity.clone());

        store.set_fail_update(true);
        assert!(sync.move_entity(&entity, "9").await.is_err());

        assert_eq!(source.lock().expect("lock").len(), 1);
        assert!(dest.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_move_to_same_folder_is_noop() {
        let (sync, store, bus) = setup();
        let entity = seed_entity(&store, "3").await;
        let log = mount_recorder(&bus, Scope::Folder("3".to_string()));

        sync.move_entity(&entity, "3")
            .await
            .expect("Same-folder move should succeed");
        assert!(log.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn test_pending_entity_refuses_mutations() {
        let (sync, _store, _bus) = setup();
        let pending = EntityNode {
            id: "temp-7".to_string(),
            name: "Ghost".to_string(),
            kind: EntityKind::Character,
            folder_id: "3".to_string(),
            pending: true,
            draft: false,
        };

        assert!(sync.move_entity(&pending, "9").await.is_err());
        assert!(sync.delete_entity(&pending).await.is_err());
        assert!(sync.rename_entity(&pending, "x").await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_follows_create_path() {
        let (sync, store, bus) = setup();
        let entity = seed_entity(&store, "3").await;
        let view = mount_entity_view(&bus, "3");

        let copy = sync
            .duplicate_entity(&entity.id)
            .await
            .expect("Failed to duplicate");

        assert_eq!(copy.name, "Hero (copy)");
        assert_eq!(copy.folder_id, "3");
        assert_ne!(copy.id, entity.id);

        let view = view.lock().expect("lock");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, copy.id);
        assert!(!view[0].pending);
    }

    #[tokio::test]
    async fn test_late_root_view_converges_by_fetching() {
        let (sync, store, bus) = setup();
        let first = mount_folder_view(&bus, Scope::Root);

        sync.create_folder("Atlas", &Scope::Root, FolderKind::Universe)
            .await
            .expect("Failed to create folder");

        // A view mounted after the fact missed every message; its own fetch
        // must still agree with the first view
        let fetched = store
            .list_subfolders(&Scope::Root)
            .await
            .expect("Failed to list root folders");

        assert_eq!(*first.lock().expect("lock"), fetched);
    }
}
