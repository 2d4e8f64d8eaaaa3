use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use socialbook_flux::StateStore;
use tracing::info;

use crate::state::{Notice, NoticeEntry, NoticeList};

/// Transient user-facing notification sink.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Keeps notices in `notice/list`.
pub struct NoticeBoard {
    store: Arc<StateStore>,
    next_id: AtomicU64,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(store: Arc<StateStore>, ttl_secs: u64) -> Self {
        Self {
            store,
            next_id: AtomicU64::new(1),
            ttl: Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
        }
    }

    /// Remove a notice by id. Returns false if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut removed = false;
        self.store.update::<NoticeList, _>(NoticeList::PATH, |list| {
            let mut list = list.unwrap_or_default();
            let before = list.items.len();
            list.items.retain(|n| n.id != id);
            removed = list.items.len() != before;
            list
        });
        removed
    }

    /// Drop notices older than the TTL. Returns how many were dropped.
    pub fn prune(&self) -> usize {
        let Some(current) = self.store.read::<NoticeList>(NoticeList::PATH) else {
            return 0;
        };
        let cutoff = Utc::now() - self.ttl;
        let stale = current.items.iter().filter(|n| n.created_at < cutoff).count();
        if stale == 0 {
            return 0;
        }
        self.store.update::<NoticeList, _>(NoticeList::PATH, |list| {
            let mut list = list.unwrap_or_default();
            list.items.retain(|n| n.created_at >= cutoff);
            list
        });
        stale
    }

    pub fn list(&self) -> Vec<NoticeEntry> {
        self.store
            .read::<NoticeList>(NoticeList::PATH)
            .map(|l| l.items)
            .unwrap_or_default()
    }
}

impl Notifier for NoticeBoard {
    fn notify(&self, notice: Notice) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        info!(id, title = %notice.title, message = %notice.message, "notice");
        let now = Utc::now();
        let cutoff = now - self.ttl;
        let entry = NoticeEntry {
            id,
            title: notice.title,
            message: notice.message,
            created_at: now,
        };
        // Expired notices go in the same write.
        self.store.update::<NoticeList, _>(NoticeList::PATH, move |list| {
            let mut list = list.unwrap_or_default();
            list.items.retain(|n| n.created_at >= cutoff);
            list.items.push(entry);
            list
        });
    }
}
