use std::{env, path::PathBuf};

use color_eyre::Result;
use config::{Environment, File, FileFormat};
use directories::ProjectDirs;
use lazy_static::lazy_static;
use serde::Deserialize;

use crate::transport::Collection;

const DEFAULT_CONFIG: &str = include_str!("../.config/config.json5");

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub config_dir: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReorderMethod {
    #[default]
    Put,
    Post,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CollectionEndpoint {
    pub list_path: String,
    pub reorder_path: String,
    #[serde(default)]
    pub reorder_method: ReorderMethod,
    /// Name of the rank field in reorder requests, e.g. `order` or `sort_order`.
    pub rank_field: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CollectionsConfig {
    pub banners: CollectionEndpoint,
    pub categories: CollectionEndpoint,
    pub career_items: CollectionEndpoint,
}

impl CollectionsConfig {
    pub fn endpoint(&self, collection: Collection) -> &CollectionEndpoint {
        match collection {
            Collection::Banners => &self.banners,
            Collection::Categories => &self.categories,
            Collection::CareerItems => &self.career_items,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TableConfig {
    pub page_size: u32,
    pub page_size_options: Vec<u32>,
    /// Cells the pointer has to travel before a press turns into a drag.
    pub drag_activation_distance: u16,
    pub mouse: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            page_size_options: vec![10, 20, 50, 100],
            drag_activation_distance: 2,
            mouse: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default, flatten)]
    pub config: AppConfig,
    pub api: ApiConfig,
    pub collections: CollectionsConfig,
    #[serde(default)]
    pub table: TableConfig,
}

lazy_static! {
    pub static ref PROJECT_NAME: String = env!("CARGO_CRATE_NAME").to_uppercase().to_string();
    pub static ref DATA_FOLDER: Option<PathBuf> =
        env::var(format!("{}_DATA", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
    pub static ref CONFIG_FOLDER: Option<PathBuf> =
        env::var(format!("{}_CONFIG", PROJECT_NAME.clone()))
            .ok()
            .map(PathBuf::from);
}

impl Config {
    /// Embedded defaults, then user config files, then `RANK_DESK__*` variables.
    /// `base_url` from the command line beats all of them.
    pub fn new(base_url: Option<String>) -> Result<Self, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();

        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Json5));

        let config_files = [
            ("config.json5", FileFormat::Json5),
            ("config.json", FileFormat::Json),
            ("config.yaml", FileFormat::Yaml),
            ("config.toml", FileFormat::Toml),
        ];
        for (file, format) in &config_files {
            let source = File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        builder
            .add_source(
                Environment::with_prefix(PROJECT_NAME.as_str())
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("api.base_url", base_url)?
            .build()?
            .try_deserialize()
    }

    #[cfg(test)]
    pub fn for_tests(base_url: &str) -> Self {
        config::Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Json5))
            .set_override("api.base_url", base_url)
            .and_then(|builder| builder.build())
            .and_then(|config| config.try_deserialize())
            .expect("embedded config to deserialize")
    }
}

pub fn get_data_dir() -> PathBuf {
    if let Some(s) = DATA_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".data")
    }
}

pub fn get_config_dir() -> PathBuf {
    if let Some(s) = CONFIG_FOLDER.clone() {
        s
    } else if let Some(proj_dirs) = project_directory() {
        proj_dirs.config_local_dir().to_path_buf()
    } else {
        PathBuf::from(".").join(".config")
    }
}

fn project_directory() -> Option<ProjectDirs> {
    ProjectDirs::from("cn", "", env!("CARGO_PKG_NAME"))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_embedded_defaults() {
        let config = Config::for_tests("http://cms.test/api");

        assert_eq!(config.api.base_url, "http://cms.test/api");
        assert_eq!(config.api.auth_token, None);
        assert_eq!(config.table, TableConfig::default());
    }

    #[test]
    fn test_endpoints_per_collection() {
        let config = Config::for_tests("http://cms.test/api");

        let banners = config.collections.endpoint(Collection::Banners);
        let career = config.collections.endpoint(Collection::CareerItems);

        assert_eq!(banners.rank_field, "order");
        assert_eq!(banners.reorder_method, ReorderMethod::Put);
        assert_eq!(career.rank_field, "sort_order");
        assert_eq!(career.reorder_method, ReorderMethod::Post);
    }

    #[test]
    fn test_table_section_is_optional() {
        let json = r#"{
            "api": { "base_url": "http://x" },
            "collections": {
                "banners": { "list_path": "/b", "reorder_path": "/b/r", "rank_field": "order" },
                "categories": { "list_path": "/c", "reorder_path": "/c/r", "rank_field": "order" },
                "career_items": { "list_path": "/i", "reorder_path": "/i/r", "rank_field": "order" }
            }
        }"#;

        let config: Config = serde_json::from_str(json).expect("minimal config");

        assert_eq!(config.table.page_size, 20);
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.collections.categories.reorder_method, ReorderMethod::Put);
    }
}
