use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use client_core::RepositoryEndpoints;
use shared::protocol::OrderSchema;
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub orders_url: String,
    pub status_update_url: String,
    pub identity_db_url: String,
    pub order_schema: OrderSchema,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            orders_url: "http://127.0.0.1:8000/api/orders".into(),
            status_update_url: "http://127.0.0.1:8000/api/orders/status".into(),
            identity_db_url: "sqlite://./data/operator.db".into(),
            order_schema: OrderSchema::Storefront,
            request_timeout_secs: Some(15),
        }
    }
}

impl Settings {
    pub fn endpoints(&self) -> anyhow::Result<RepositoryEndpoints> {
        let orders_url = Url::parse(&self.orders_url)
            .with_context(|| format!("invalid orders url '{}'", self.orders_url))?;
        let status_update_url = Url::parse(&self.status_update_url).with_context(|| {
            format!("invalid status update url '{}'", self.status_update_url)
        })?;

        let mut endpoints =
            RepositoryEndpoints::new(orders_url, status_update_url).with_schema(self.order_schema);
        if let Some(secs) = self.request_timeout_secs.filter(|secs| *secs > 0) {
            endpoints = endpoints.with_request_timeout(Duration::from_secs(secs));
        }
        Ok(endpoints)
    }
}

pub fn load_settings(path: &Path) -> Settings {
    let file_contents = fs::read_to_string(path).ok();
    load_settings_from(file_contents.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the flat TOML file, then environment variables.
pub fn load_settings_from(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<HashMap<String, String>>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("orders_url") {
                    settings.orders_url = v.clone();
                }
                if let Some(v) = file_cfg.get("status_update_url") {
                    settings.status_update_url = v.clone();
                }
                if let Some(v) = file_cfg.get("identity_db_url") {
                    settings.identity_db_url = v.clone();
                }
                if let Some(v) = file_cfg.get("order_schema") {
                    apply_schema(&mut settings, v);
                }
                if let Some(v) = file_cfg.get("request_timeout_secs") {
                    apply_timeout(&mut settings, v);
                }
            }
            Err(err) => warn!(error = %err, "ignoring unreadable config file"),
        }
    }

    if let Some(v) = env("ORDERS_URL") {
        settings.orders_url = v;
    }
    if let Some(v) = env("APP__ORDERS_URL") {
        settings.orders_url = v;
    }

    if let Some(v) = env("STATUS_UPDATE_URL") {
        settings.status_update_url = v;
    }
    if let Some(v) = env("APP__STATUS_UPDATE_URL") {
        settings.status_update_url = v;
    }

    if let Some(v) = env("IDENTITY_DB_URL") {
        settings.identity_db_url = v;
    }
    if let Some(v) = env("APP__IDENTITY_DB_URL") {
        settings.identity_db_url = v;
    }

    if let Some(v) = env("APP__ORDER_SCHEMA") {
        apply_schema(&mut settings, &v);
    }

    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        apply_timeout(&mut settings, &v);
    }

    settings.identity_db_url = normalize_database_url(&settings.identity_db_url);
    settings
}

fn apply_schema(settings: &mut Settings, raw: &str) {
    match raw.parse::<OrderSchema>() {
        Ok(schema) => settings.order_schema = schema,
        Err(err) => warn!(error = %err, "keeping order schema {}", settings.order_schema),
    }
}

fn apply_timeout(settings: &mut Settings, raw: &str) {
    match raw.trim().parse::<u64>() {
        Ok(0) => settings.request_timeout_secs = None,
        Ok(secs) => settings.request_timeout_secs = Some(secs),
        Err(_) => warn!(value = raw, "ignoring non-numeric request timeout"),
    }
}

fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().identity_db_url;
    }

    if raw_database_url.starts_with("sqlite:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
