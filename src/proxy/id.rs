//! Connection id assignment strategies

use crate::datasource::Connection;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Assigns an id to every connection a proxy hands out
pub trait ConnectionIdManager: Send + Sync {
    /// Id for a freshly acquired connection
    fn get_id(&self, connection: &dyn Connection) -> String;

    /// Called once a proxied connection has been closed
    fn add_closed_id(&self, id: &str);

    /// Ids handed out and not yet closed
    fn open_connection_ids(&self) -> HashSet<String>;
}

#[derive(Default)]
struct OpenIds(Mutex<HashSet<String>>);

impl OpenIds {
    fn track(&self, id: String) -> String {
        self.0.lock().insert(id.clone());
        id
    }

    fn remove(&self, id: &str) {
        self.0.lock().remove(id);
    }

    fn snapshot(&self) -> HashSet<String> {
        self.0.lock().clone()
    }
}

/// Sequential ids starting at 1, counted per manager
#[derive(Default)]
pub struct DefaultConnectionIdManager {
    next_id: AtomicU64,
    open: OpenIds,
}

impl DefaultConnectionIdManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConnectionIdManager for DefaultConnectionIdManager {
    fn get_id(&self, _connection: &dyn Connection) -> String {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.open.track(id.to_string())
    }

    fn add_closed_id(&self, id: &str) {
        self.open.remove(id);
    }

    fn open_connection_ids(&self) -> HashSet<String> {
        self.open.snapshot()
    }
}

lazy_static! {
    static ref GLOBAL_CONNECTION_ID: AtomicU64 = AtomicU64::new(0);
}

/// Sequential ids drawn from one process-wide counter
///
/// Ids stay unique across every data source using this strategy.
/// Open ids are still tracked per manager.
#[derive(Default)]
pub struct GlobalConnectionIdManager {
    open: OpenIds,
}

impl GlobalConnectionIdManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConnectionIdManager for GlobalConnectionIdManager {
    fn get_id(&self, _connection: &dyn Connection) -> String {
        let id = GLOBAL_CONNECTION_ID.fetch_add(1, Ordering::SeqCst) + 1;
        self.open.track(id.to_string())
    }

    fn add_closed_id(&self, id: &str) {
        self.open.remove(id);
    }

    fn open_connection_ids(&self) -> HashSet<String> {
        self.open.snapshot()
    }
}

/// Random (v4) UUID ids
#[derive(Default)]
pub struct UuidConnectionIdManager {
    open: OpenIds,
}

impl UuidConnectionIdManager {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConnectionIdManager for UuidConnectionIdManager {
    fn get_id(&self, _connection: &dyn Connection) -> String {
        self.open.track(Uuid::new_v4().to_string())
    }

    fn add_closed_id(&self, id: &str) {
        self.open.remove(id);
    }

    fn open_connection_ids(&self) -> HashSet<String> {
        self.open.snapshot()
    }
}
