//! Service wiring: store, review pipeline, navigation layout and sessions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tutoria_auth::GrantedRoleSet;
use tutoria_core::UserId;
use tutoria_infra::{seed, InMemoryAccessRequestStore, ReviewService, StoreError};
use tutoria_navigation::{DashboardController, NavigationConfig, NavigationModel};

use crate::config::ApiConfig;

pub struct AppServices {
    pub store: Arc<InMemoryAccessRequestStore>,
    pub reviews: ReviewService<InMemoryAccessRequestStore>,
    pub navigation: Arc<NavigationConfig>,
    pub dashboard: DashboardController,
    pub sessions: SessionRegistry,
}

pub fn build_services(config: &ApiConfig) -> Result<AppServices, StoreError> {
    let store = Arc::new(InMemoryAccessRequestStore::new());
    if config.seed_demo {
        seed::seed_demo(&store)?;
    }

    let navigation = Arc::new(NavigationConfig::portal_default());

    Ok(AppServices {
        reviews: ReviewService::new(store.clone()),
        store,
        dashboard: DashboardController::new(navigation.clone()),
        sessions: SessionRegistry::new(navigation.clone()),
        navigation,
    })
}

/// One [`NavigationModel`] per user holding at least one role.
///
/// Every access first installs the caller's current grants, so a revoked tab
/// is left before the handler sees the model. Callers without roles can only
/// be on home; they get a throwaway model and no stored session.
pub struct SessionRegistry {
    config: Arc<NavigationConfig>,
    sessions: Mutex<HashMap<UserId, NavigationModel>>,
}

impl SessionRegistry {
    pub fn new(config: Arc<NavigationConfig>) -> Self {
        Self {
            config,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_session<R>(
        &self,
        user: UserId,
        granted: &GrantedRoleSet,
        f: impl FnOnce(&mut NavigationModel) -> R,
    ) -> R {
        let mut sessions = self.lock();
        if granted.is_empty() {
            if sessions.remove(&user).is_some_and(|m| !m.state().active_tab.is_home()) {
                tracing::info!(user_id = %user, "all roles revoked; session dropped");
            }
            drop(sessions);
            let mut model = NavigationModel::new(self.config.clone(), GrantedRoleSet::empty());
            return f(&mut model);
        }

        let model = sessions
            .entry(user)
            .or_insert_with(|| NavigationModel::new(self.config.clone(), granted.clone()));

        if model.on_roles_changed(granted.clone()) {
            tracing::info!(user_id = %user, "active tab revoked; session returned home");
        }
        f(model)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<UserId, NavigationModel>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
