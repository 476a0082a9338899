use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub http_bind_addr: String,
    pub http_port: u16,
    pub webhook_path: String,
    pub ack_storage_failures: bool,
    pub database_url: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let http_bind_addr =
            env::var("HTTP_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0".to_string());
        let http_port = env::var("HTTP_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);
        let webhook_path =
            env::var("WEBHOOK_PATH").unwrap_or_else(|_| "/api/sms".to_string());

        // Opt-in: keep returning 200 when the sink write fails so constrained
        // sender devices stop retrying. Off by default; failures propagate.
        let ack_storage_failures = env::var("ACK_STORAGE_FAILURES")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        let db_host = env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string());
        let db_port = env::var("DB_PORT").unwrap_or_else(|_| "5432".to_string());
        let db_name = env::var("DB_DATABASE").unwrap_or_else(|_| "alerts".to_string());
        let db_user = env::var("DB_USER").unwrap_or_else(|_| "ingest".to_string());
        let db_pwd = env::var("DB_PWD").unwrap_or_else(|_| "ingest".to_string());

        let database_url = format!(
            "postgres://{}:{}@{}:{}/{}",
            db_user, db_pwd, db_host, db_port, db_name
        );

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            http_bind_addr,
            http_port,
            webhook_path,
            ack_storage_failures,
            database_url,
            log_level,
        })
    }
}
