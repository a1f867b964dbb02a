use crate::server::database::AppStore;
use crate::server::fraud::FraudCheck;
use crate::server::session::SessionKeys;

pub(crate) struct AppState {
    store: AppStore,
    sessions: SessionKeys,
    fraud_check: FraudCheck,
}

impl AppState {
    pub fn new(store: AppStore, sessions: SessionKeys, fraud_check: FraudCheck) -> Self {
        Self {
            store,
            sessions,
            fraud_check,
        }
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    pub fn sessions(&self) -> &SessionKeys {
        &self.sessions
    }

    pub fn fraud_check(&self) -> FraudCheck {
        self.fraud_check
    }
}
