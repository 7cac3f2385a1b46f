use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

use crate::accounts::store::{AccountStore, PgAccountStore};
use crate::config::AppConfig;
use crate::email::{Mailer, SmtpMailer};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub mailer: Arc<dyn Mailer>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            tracing::warn!(error = %e, "migration failed; continuing");
        }

        let store = Arc::new(PgAccountStore::new(db)) as Arc<dyn AccountStore>;
        let mailer = Arc::new(SmtpMailer::new(&config.smtp)?) as Arc<dyn Mailer>;

        Ok(Self::from_parts(store, mailer, config))
    }

    pub fn from_parts(
        store: Arc<dyn AccountStore>,
        mailer: Arc<dyn Mailer>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            mailer,
            config,
        }
    }
}
