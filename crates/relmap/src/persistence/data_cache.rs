use relmap_core::stmt::Record;

use uuid::Uuid;

/// An optional shared cache of business objects, consulted on reads and
/// refreshed on writes.
///
/// Best effort: implementations may drop or forget entries at any time,
/// and persistence never depends on an entry being present.
pub trait DataCache: Send + Sync + 'static {
    fn get(&self, class: &str, key: Uuid) -> Option<Record>;

    /// Stores or replaces the object with `key`.
    fn add(&self, key: Uuid, record: &Record);

    fn remove(&self, class: &str, key: Uuid);
}
