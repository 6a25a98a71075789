use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::{CacheConsistencyManager, QueryCache};
use crate::models::DateTemplate;
use crate::planner::PlannerSession;
use crate::services::{
    BatchReconciler, BulkPatcher, DateMutations, DateQueries, MemoryNotifier, Notice, Notifier,
};
use crate::store::DateStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DateStore>,
    pub session: Arc<Mutex<PlannerSession>>,
    pub cache: QueryCache,
    pub notices: Arc<MemoryNotifier>,
    pub reconciler: Arc<BatchReconciler>,
    pub bulk: Arc<BulkPatcher>,
    pub mutations: Arc<DateMutations>,
    pub queries: Arc<DateQueries>,
}

impl AppState {
    pub fn new(store: Arc<dyn DateStore>, template: DateTemplate) -> Self {
        let cache = QueryCache::new();
        let notices = Arc::new(MemoryNotifier::new());
        let notifier: Arc<dyn Notifier> = notices.clone();

        Self {
            session: Arc::new(Mutex::new(PlannerSession::new(template))),
            reconciler: Arc::new(BatchReconciler::new(
                store.clone(),
                cache.clone(),
                notifier.clone(),
            )),
            bulk: Arc::new(BulkPatcher::new(store.clone(), cache.clone(), notifier.clone())),
            mutations: Arc::new(DateMutations::new(
                store.clone(),
                CacheConsistencyManager::new(cache.clone(), notifier),
            )),
            queries: Arc::new(DateQueries::new(store.clone(), cache.clone())),
            store,
            cache,
            notices,
        }
    }

    /// Never hold the guard across an await.
    pub fn lock_session(&self) -> MutexGuard<'_, PlannerSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn take_notices(&self) -> Vec<Notice> {
        self.notices.drain()
    }
}
