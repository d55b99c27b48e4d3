use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::sms::SmsClient;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    sms: SmsClient,
}

impl AppState {
    pub(crate) fn new(settings: Settings, db: PgPool, sms: SmsClient) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, sms }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn sms(&self) -> &SmsClient {
        &self.inner.sms
    }
}
