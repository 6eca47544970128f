//! Tree Message Bus
//!
//! In-process publish/subscribe channel carrying typed tree mutation
//! messages. Listeners register for exactly one scope; publish is
//! synchronous and fire-and-forget, with no replay for late subscribers.
//! The bus is constructed once and handed to components through context,
//! never reached through a global.

use std::sync::{Arc, Mutex};

use crate::models::{EntityNode, FolderNode, Scope};

/// Snapshot payload carried by insert/confirm messages
#[derive(Debug, Clone, PartialEq)]
pub enum NodePayload {
    Folder(FolderNode),
    Entity(EntityNode),
}

impl NodePayload {
    pub fn id(&self) -> &str {
        match self {
            NodePayload::Folder(f) => &f.id,
            NodePayload::Entity(e) => &e.id,
        }
    }
}

/// Which collection a removal targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Folder,
    Entity,
}

/// The closed set of tree mutations a listener can receive
#[derive(Debug, Clone, PartialEq)]
pub enum TreeMessageKind {
    /// Provisional node inserted before the server has confirmed it
    OptimisticInsert { node: NodePayload },
    /// Replace the element carrying `old_id` with the settled snapshot
    Confirm { old_id: String, node: NodePayload },
    /// Drop the element with this id (rollback or confirmed delete)
    Remove { id: String, kind: NodeKind },
    /// Entity left this scope as the source half of a move
    MoveOut { entity_id: String },
    /// Entity arrived in this scope as the destination half of a move
    MoveIn { entity: EntityNode },
    /// Local copy can no longer be trusted; refetch
    Invalidate,
}

/// One message on the bus, addressed to a single scope
#[derive(Debug, Clone, PartialEq)]
pub struct TreeMessage {
    pub scope: Scope,
    pub kind: TreeMessageKind,
}

/// Handle returned by subscribe, used to deregister on unmount
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type ListenerFn = Arc<dyn Fn(&TreeMessage) + Send + Sync>;

struct Listener {
    id: SubscriptionId,
    scope: Scope,
    callback: ListenerFn,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: Vec<Listener>,
}

/// Clonable handle to the shared listener registry
#[derive(Clone, Default)]
pub struct TreeBus {
    inner: Arc<Mutex<BusInner>>,
}

impl TreeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for messages addressed to `scope`.
    /// Call once per component mount; deregister with [`Self::unsubscribe`].
    pub fn subscribe(
        &self,
        scope: Scope,
        callback: impl Fn(&TreeMessage) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let mut inner = self.inner.lock().expect("bus listeners lock");
        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);
        inner.listeners.push(Listener {
            id,
            scope,
            callback: Arc::new(callback),
        });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .lock()
            .expect("bus listeners lock")
            .listeners
            .retain(|l| l.id != id);
    }

    /// Deliver `msg` to every listener whose scope matches exactly.
    /// A message with no matching listener is silently dropped.
    pub fn publish(&self, msg: TreeMessage) {
        // Snapshot callbacks outside the lock so a handler may publish
        // or (un)subscribe reentrantly.
        let matching: Vec<ListenerFn> = self
            .inner
            .lock()
            .expect("bus listeners lock")
            .listeners
            .iter()
            .filter(|l| l.scope == msg.scope)
            .map(|l| Arc::clone(&l.callback))
            .collect();
        for callback in matching {
            callback(&msg);
        }
    }

    #[cfg(test)]
    fn listener_count(&self) -> usize {
        self.inner.lock().expect("bus listeners lock").listeners.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityKind;

    fn entity(id: &str, folder_id: &str) -> EntityNode {
        EntityNode {
            id: id.to_string(),
            name: format!("Entity {}", id),
            kind: EntityKind::Character,
            folder_id: folder_id.to_string(),
            pending: false,
            draft: false,
        }
    }

    fn remove_msg(scope: Scope, id: &str) -> TreeMessage {
        TreeMessage {
            scope,
            kind: TreeMessageKind::Remove {
                id: id.to_string(),
                kind: NodeKind::Entity,
            },
        }
    }

    fn counter() -> (Arc<Mutex<u32>>, impl Fn(&TreeMessage) + Send + Sync + 'static) {
        let hits = Arc::new(Mutex::new(0u32));
        let h = Arc::clone(&hits);
        (hits, move |_: &TreeMessage| {
            *h.lock().expect("test counter lock") += 1
        })
    }

    #[test]
    fn test_delivers_to_exact_scope_only() {
        let bus = TreeBus::new();
        let (hits_a, on_a) = counter();
        let (hits_b, on_b) = counter();

        bus.subscribe(Scope::Folder("3".into()), on_a);
        bus.subscribe(Scope::Folder("9".into()), on_b);

        bus.publish(remove_msg(Scope::Folder("3".into()), "7"));

        assert_eq!(*hits_a.lock().expect("lock"), 1);
        assert_eq!(*hits_b.lock().expect("lock"), 0);
    }

    #[test]
    fn test_root_scope_is_distinct_from_folders() {
        let bus = TreeBus::new();
        let (hits, on_msg) = counter();
        bus.subscribe(Scope::Root, on_msg);

        bus.publish(remove_msg(Scope::Folder("1".into()), "x"));
        assert_eq!(*hits.lock().expect("lock"), 0);

        bus.publish(remove_msg(Scope::Root, "x"));
        assert_eq!(*hits.lock().expect("lock"), 1);
    }

    #[test]
    fn test_no_delivery_after_unsubscribe() {
        let bus = TreeBus::new();
        let (hits, on_msg) = counter();

        let sub = bus.subscribe(Scope::Root, on_msg);
        bus.publish(remove_msg(Scope::Root, "a"));
        bus.unsubscribe(sub);
        bus.publish(remove_msg(Scope::Root, "b"));

        assert_eq!(*hits.lock().expect("lock"), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_publish_without_listeners_is_dropped() {
        let bus = TreeBus::new();
        // Must not panic or queue anything
        bus.publish(remove_msg(Scope::Folder("nobody".into()), "a"));
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_handler_may_publish_reentrantly() {
        let bus = TreeBus::new();
        let log: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

        let bus2 = bus.clone();
        let l = Arc::clone(&log);
        bus.subscribe(Scope::Folder("src".into()), move |msg| {
            if let TreeMessageKind::MoveOut { entity_id } = &msg.kind {
                l.lock().expect("lock").push(format!("out:{}", entity_id));
                // Forward the pair the way a coordinator would
                bus2.publish(TreeMessage {
                    scope: Scope::Folder("dst".into()),
                    kind: TreeMessageKind::MoveIn {
                        entity: entity(entity_id, "dst"),
                    },
                });
            }
        });
        let l = Arc::clone(&log);
        bus.subscribe(Scope::Folder("dst".into()), move |msg| {
            if let TreeMessageKind::MoveIn { entity } = &msg.kind {
                l.lock().expect("lock").push(format!("in:{}", entity.id));
            }
        });

        bus.publish(TreeMessage {
            scope: Scope::Folder("src".into()),
            kind: TreeMessageKind::MoveOut {
                entity_id: "7".into(),
            },
        });

        assert_eq!(
            *log.lock().expect("lock"),
            vec!["out:7".to_string(), "in:7".to_string()]
        );
    }

    #[test]
    fn test_two_listeners_same_scope_both_receive() {
        let bus = TreeBus::new();
        let (hits, on_a) = counter();
        bus.subscribe(Scope::Root, on_a);
        let h = Arc::clone(&hits);
        bus.subscribe(Scope::Root, move |_| {
            *h.lock().expect("lock") += 1
        });

        bus.publish(remove_msg(Scope::Root, "a"));
        assert_eq!(*hits.lock().expect("lock"), 2);
    }
}
