use std::path::PathBuf;

use serde::Deserialize;

use crate::config::Config;
use crate::page::Page;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    pub page: Page,
}
