use crate::domain::events::ServerEvent;
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashSet;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A live client channel. One user may hold several at once (tabs, devices).
#[derive(Clone, Debug)]
pub struct Connection {
    pub id: Uuid,
    pub user_id: Uuid,
    pub tx: mpsc::Sender<ServerEvent>,
}

impl Connection {
    #[must_use]
    pub fn new(user_id: Uuid, tx: mpsc::Sender<ServerEvent>) -> Self {
        Self { id: Uuid::new_v4(), user_id, tx }
    }
}

/// Who is connected and which match rooms their connections have joined.
///
/// Presence is best-effort and process-local in [`LocalPresence`]; nothing durable may depend on it.
#[async_trait]
pub trait PresenceService: Send + Sync + std::fmt::Debug {
    /// Adds a connection. Returns `true` if this is the user's first live connection.
    async fn register(&self, connection: Connection) -> bool;

    /// Removes a connection and its room memberships. Returns `true` if the user has no
    /// connections left. Unknown connection ids are ignored.
    async fn unregister(&self, user_id: Uuid, conn_id: Uuid) -> bool;

    async fn is_online(&self, user_id: Uuid) -> bool;

    /// All live connections of one user.
    async fn connections_for(&self, user_id: Uuid) -> Vec<Connection>;

    /// Every live connection on this node.
    async fn connections(&self) -> Vec<Connection>;

    /// Returns `false` if the connection is not registered.
    async fn join_room(&self, match_id: Uuid, conn_id: Uuid) -> bool;

    async fn leave_room(&self, match_id: Uuid, conn_id: Uuid);

    async fn room_members(&self, match_id: Uuid) -> Vec<Connection>;
}

/// In-memory presence for a single process.
#[derive(Debug, Default)]
pub struct LocalPresence {
    connections: DashMap<Uuid, Connection>,
    users: DashMap<Uuid, HashSet<Uuid>>,
    rooms: DashMap<Uuid, HashSet<Uuid>>,
}

impl LocalPresence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, conn_ids: impl IntoIterator<Item = Uuid>) -> Vec<Connection> {
        conn_ids.into_iter().filter_map(|id| self.connections.get(&id).map(|c| c.value().clone())).collect()
    }
}

#[async_trait]
impl PresenceService for LocalPresence {
    async fn register(&self, connection: Connection) -> bool {
        let user_id = connection.user_id;
        let conn_id = connection.id;
        self.connections.insert(conn_id, connection);

        let mut ids = self.users.entry(user_id).or_default();
        ids.insert(conn_id);
        ids.len() == 1
    }

    async fn unregister(&self, user_id: Uuid, conn_id: Uuid) -> bool {
        if self.connections.remove(&conn_id).is_none() {
            return !self.users.contains_key(&user_id);
        }

        self.rooms.retain(|_, members| {
            members.remove(&conn_id);
            !members.is_empty()
        });

        let offline = {
            match self.users.get_mut(&user_id) {
                Some(mut ids) => {
                    ids.remove(&conn_id);
                    ids.is_empty()
                }
                None => true,
            }
        };
        if offline {
            self.users.remove_if(&user_id, |_, ids| ids.is_empty());
        }
        offline
    }

    async fn is_online(&self, user_id: Uuid) -> bool {
        self.users.get(&user_id).is_some_and(|ids| !ids.is_empty())
    }

    async fn connections_for(&self, user_id: Uuid) -> Vec<Connection> {
        let ids: Vec<Uuid> = self.users.get(&user_id).map(|ids| ids.iter().copied().collect()).unwrap_or_default();
        self.resolve(ids)
    }

    async fn connections(&self) -> Vec<Connection> {
        self.connections.iter().map(|entry| entry.value().clone()).collect()
    }

    async fn join_room(&self, match_id: Uuid, conn_id: Uuid) -> bool {
        if !self.connections.contains_key(&conn_id) {
            return false;
        }
        self.rooms.entry(match_id).or_default().insert(conn_id);
        true
    }

    async fn leave_room(&self, match_id: Uuid, conn_id: Uuid) {
        let emptied = {
            match self.rooms.get_mut(&match_id) {
                Some(mut members) => {
                    members.remove(&conn_id);
                    members.is_empty()
                }
                None => false,
            }
        };
        if emptied {
            self.rooms.remove_if(&match_id, |_, members| members.is_empty());
        }
    }

    async fn room_members(&self, match_id: Uuid) -> Vec<Connection> {
        let ids: Vec<Uuid> = self.rooms.get(&match_id).map(|m| m.iter().copied().collect()).unwrap_or_default();
        self.resolve(ids)
    }
}
