//! In-memory store of open creation wizards.
//!
//! Each draft belongs to the user who opened it and is invisible to anyone
//! else. A draft sits behind its own mutex, so concurrent requests against
//! one draft run one at a time while different drafts proceed in parallel.
//! Nothing here survives a restart.
//!
//! Drafts left idle longer than [`DraftLimits::idle_timeout`] are evicted,
//! and each user keeps at most [`DraftLimits::max_per_owner`] drafts; opening
//! one more discards that user's least recently used draft.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use uuid::Uuid;

use schoolhub_core::error::CoreError;
use schoolhub_core::types::DbId;
use schoolhub_core::wizard::{SchoolWizard, WizardSettings};

/// Default idle time before a draft is evicted.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Default number of drafts one user may hold.
pub const DEFAULT_MAX_PER_OWNER: usize = 3;

/// Interval between idle sweeps.
const SWEEP_INTERVAL_SECS: u64 = 60;

/// Shared handle to one wizard.
pub type DraftHandle = Arc<Mutex<SchoolWizard>>;

/// Retention limits for open drafts.
#[derive(Debug, Clone, Copy)]
pub struct DraftLimits {
    pub idle_timeout: Duration,
    pub max_per_owner: usize,
}

impl Default for DraftLimits {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_per_owner: DEFAULT_MAX_PER_OWNER,
        }
    }
}

struct DraftEntry {
    owner: DbId,
    wizard: DraftHandle,
    touched_at: Instant,
    /// Set while a submission runs; the entry is then neither readable,
    /// removable nor evictable.
    submitting: bool,
}

pub struct DraftStore {
    settings: WizardSettings,
    limits: DraftLimits,
    drafts: RwLock<HashMap<Uuid, DraftEntry>>,
}

impl DraftStore {
    pub fn new(settings: WizardSettings, limits: DraftLimits) -> Self {
        Self {
            settings,
            limits,
            drafts: RwLock::new(HashMap::new()),
        }
    }

    /// Open a fresh wizard for `owner`, evicting idle drafts and the owner's
    /// oldest draft when they are at their limit.
    pub async fn open(&self, owner: DbId) -> (Uuid, DraftHandle) {
        let mut wizard = SchoolWizard::new(self.settings.clone());
        wizard.open();
        let handle = Arc::new(Mutex::new(wizard));

        let now = Instant::now();
        let mut drafts = self.drafts.write().await;
        evict_idle(&mut drafts, now, self.limits.idle_timeout);

        while drafts.values().filter(|e| e.owner == owner).count() >= self.limits.max_per_owner.max(1) {
            let oldest = drafts
                .iter()
                .filter(|(_, e)| e.owner == owner && !e.submitting)
                .min_by_key(|(_, e)| e.touched_at)
                .map(|(id, _)| *id);
            let Some(oldest) = oldest else { break };
            drafts.remove(&oldest);
            tracing::info!(draft_id = %oldest, owner, "Oldest creation draft replaced");
        }

        let id = Uuid::new_v4();
        drafts.insert(
            id,
            DraftEntry {
                owner,
                wizard: Arc::clone(&handle),
                touched_at: now,
                submitting: false,
            },
        );
        tracing::debug!(draft_id = %id, owner, "Creation draft opened");
        (id, handle)
    }

    /// The wizard for `id` if `owner` opened it.
    pub async fn get(&self, id: Uuid, owner: DbId) -> Result<DraftHandle, CoreError> {
        let mut drafts = self.drafts.write().await;
        let entry = owned_entry(&mut drafts, id, owner)?;
        if entry.submitting {
            return Err(in_progress());
        }
        entry.touched_at = Instant::now();
        Ok(Arc::clone(&entry.wizard))
    }

    /// Forget a draft. Returns the handle so the caller can finish with it.
    /// A draft that is being submitted cannot be removed.
    pub async fn remove(&self, id: Uuid, owner: DbId) -> Result<DraftHandle, CoreError> {
        let mut drafts = self.drafts.write().await;
        if owned_entry(&mut drafts, id, owner)?.submitting {
            return Err(in_progress());
        }
        let entry = drafts.remove(&id).ok_or_else(|| not_found(id))?;
        tracing::debug!(draft_id = %id, owner, "Creation draft discarded");
        Ok(entry.wizard)
    }

    /// Mark a draft as submitting and hand out its wizard. Only one
    /// submission per draft may run at a time.
    pub async fn begin_submit(&self, id: Uuid, owner: DbId) -> Result<DraftHandle, CoreError> {
        let mut drafts = self.drafts.write().await;
        let entry = owned_entry(&mut drafts, id, owner)?;
        if entry.submitting {
            return Err(in_progress());
        }
        entry.submitting = true;
        entry.touched_at = Instant::now();
        Ok(Arc::clone(&entry.wizard))
    }

    /// End a submission. A created school takes its draft with it; a failed
    /// one leaves the draft in place for a retry.
    pub async fn finish_submit(&self, id: Uuid, created: bool) {
        let mut drafts = self.drafts.write().await;
        if created {
            drafts.remove(&id);
            tracing::debug!(draft_id = %id, "Creation draft submitted");
        } else if let Some(entry) = drafts.get_mut(&id) {
            entry.submitting = false;
            entry.touched_at = Instant::now();
        }
    }

    /// Drop every draft idle for longer than the idle timeout. Returns how
    /// many were dropped.
    pub async fn evict_idle(&self) -> usize {
        let mut drafts = self.drafts.write().await;
        evict_idle(&mut drafts, Instant::now(), self.limits.idle_timeout)
    }

    pub async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Spawn a background task that evicts idle drafts once a minute.
pub fn start_draft_sweeper(store: Arc<DraftStore>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let evicted = store.evict_idle().await;
            if evicted > 0 {
                tracing::info!(evicted, "Idle creation drafts evicted");
            }
        }
    })
}

fn evict_idle(drafts: &mut HashMap<Uuid, DraftEntry>, now: Instant, idle_timeout: Duration) -> usize {
    let before = drafts.len();
    drafts.retain(|_, e| e.submitting || now.duration_since(e.touched_at) <= idle_timeout);
    before - drafts.len()
}

fn owned_entry(
    drafts: &mut HashMap<Uuid, DraftEntry>,
    id: Uuid,
    owner: DbId,
) -> Result<&mut DraftEntry, CoreError> {
    drafts
        .get_mut(&id)
        .filter(|entry| entry.owner == owner)
        .ok_or_else(|| not_found(id))
}

fn not_found(id: Uuid) -> CoreError {
    CoreError::NotFound {
        entity: "SchoolDraft",
        id: id.to_string(),
    }
}

fn in_progress() -> CoreError {
    CoreError::Conflict("School creation is in progress".into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn store() -> DraftStore {
        DraftStore::new(WizardSettings::default(), DraftLimits::default())
    }

    #[tokio::test]
    async fn opened_draft_is_open_and_owned() {
        let store = store();
        let (id, handle) = store.open(7).await;

        assert!(handle.lock().await.is_open());
        assert!(store.get(id, 7).await.is_ok());
        assert_matches!(store.get(id, 8).await, Err(CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn only_owner_can_remove() {
        let store = store();
        let (id, _) = store.open(7).await;

        assert!(store.remove(id, 8).await.is_err());
        assert_eq!(store.len().await, 1);

        assert!(store.remove(id, 7).await.is_ok());
        assert!(store.is_empty().await);
        assert!(store.get(id, 7).await.is_err());
    }

    #[tokio::test]
    async fn submitting_draft_is_locked() {
        let store = store();
        let (id, _) = store.open(7).await;

        store.begin_submit(id, 7).await.unwrap();

        assert_matches!(store.begin_submit(id, 7).await, Err(CoreError::Conflict(_)));
        assert_matches!(store.remove(id, 7).await, Err(CoreError::Conflict(_)));
        assert_matches!(store.get(id, 7).await, Err(CoreError::Conflict(_)));
        assert_matches!(store.begin_submit(id, 8).await, Err(CoreError::NotFound { .. }));

        store.finish_submit(id, false).await;
        assert!(store.get(id, 7).await.is_ok());

        store.begin_submit(id, 7).await.unwrap();
        store.finish_submit(id, true).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_drafts_are_evicted() {
        let store = DraftStore::new(
            WizardSettings::default(),
            DraftLimits {
                idle_timeout: Duration::from_secs(600),
                max_per_owner: 3,
            },
        );
        let (stale, _) = store.open(7).await;
        let (busy, _) = store.open(8).await;
        store.begin_submit(busy, 8).await.unwrap();

        tokio::time::advance(Duration::from_secs(400)).await;
        let (fresh, _) = store.open(9).await;

        tokio::time::advance(Duration::from_secs(400)).await;
        assert_eq!(store.evict_idle().await, 1);

        assert_matches!(store.get(stale, 7).await, Err(CoreError::NotFound { .. }));
        assert!(store.get(fresh, 9).await.is_ok());
        assert_eq!(store.len().await, 2, "a running submission is never evicted");
    }

    #[tokio::test(start_paused = true)]
    async fn opening_past_the_cap_replaces_oldest() {
        let store = DraftStore::new(
            WizardSettings::default(),
            DraftLimits {
                idle_timeout: DEFAULT_IDLE_TIMEOUT,
                max_per_owner: 2,
            },
        );
        let (first, _) = store.open(7).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        let (second, _) = store.open(7).await;
        tokio::time::advance(Duration::from_secs(1)).await;
        store.get(first, 7).await.unwrap();
        let (other, _) = store.open(8).await;

        let (third, _) = store.open(7).await;

        assert_matches!(store.get(second, 7).await, Err(CoreError::NotFound { .. }));
        assert!(store.get(first, 7).await.is_ok());
        assert!(store.get(third, 7).await.is_ok());
        assert!(store.get(other, 8).await.is_ok());
        assert_eq!(store.len().await, 3);
    }
}
