mod file_config;

pub use file_config::{CatalogConfig, FileConfig, StoreConfig, WarehouseConfig};

use anyhow::{bail, Result};

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub playlist_id: Option<String>,
    pub table: Option<String>,
}

/// Credentials and target for the upstream catalog.
#[derive(Debug, Clone)]
pub struct CatalogSettings {
    pub client_id: String,
    pub client_secret: String,
    pub playlist_id: String,
}

/// Intermediate object store. Exactly one backend must be configured: a
/// bucket (S3) or a local directory.
#[derive(Debug, Clone, Default)]
pub struct StoreSettings {
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub local_dir: Option<String>,
}

/// Warehouse session and load target. Optional as a whole: the extract
/// stage runs without it.
#[derive(Debug, Clone)]
pub struct WarehouseSettings {
    pub account: String,
    pub token: String,
    pub database: String,
    pub schema: String,
    pub warehouse: String,
    pub role: Option<String>,
    pub table: String,
    pub stage: String,
    pub stage_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub catalog: CatalogSettings,
    pub store: StoreSettings,
    pub warehouse: Option<WarehouseSettings>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// CLI values override TOML values where both are present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let catalog_file = file.catalog.unwrap_or_default();
        let Some(client_id) = catalog_file.client_id else {
            bail!("catalog.client_id must be set in the config file");
        };
        let Some(client_secret) = catalog_file.client_secret else {
            bail!("catalog.client_secret must be set in the config file");
        };
        let Some(playlist_id) = cli.playlist_id.clone().or(catalog_file.playlist_id) else {
            bail!("playlist id must be specified via --playlist-id or catalog.playlist_id");
        };
        let catalog = CatalogSettings {
            client_id,
            client_secret,
            playlist_id,
        };

        let store_file = file.store.unwrap_or_default();
        if store_file.bucket.is_some() && store_file.local_dir.is_some() {
            bail!("store.bucket and store.local_dir are mutually exclusive");
        }
        if store_file.bucket.is_none() && store_file.local_dir.is_none() {
            bail!("either store.bucket or store.local_dir must be set");
        }
        let store = StoreSettings {
            bucket: store_file.bucket.clone(),
            region: store_file.region,
            endpoint: store_file.endpoint,
            access_key_id: store_file.access_key_id,
            secret_access_key: store_file.secret_access_key,
            local_dir: store_file.local_dir,
        };

        let warehouse = match file.warehouse {
            None => None,
            Some(wh) => {
                let Some(account) = wh.account else {
                    bail!("warehouse.account must be set when a warehouse section is present");
                };
                let Some(token) = wh.token else {
                    bail!("warehouse.token must be set when a warehouse section is present");
                };
                let Some(database) = wh.database else {
                    bail!("warehouse.database must be set when a warehouse section is present");
                };
                let Some(schema) = wh.schema else {
                    bail!("warehouse.schema must be set when a warehouse section is present");
                };
                let Some(warehouse) = wh.warehouse else {
                    bail!("warehouse.warehouse must be set when a warehouse section is present");
                };

                let table = cli
                    .table
                    .clone()
                    .or(wh.table)
                    .unwrap_or_else(|| "track_features".to_string());
                let stage = wh.stage.unwrap_or_else(|| format!("{}_stage", table));
                let stage_url = match wh.stage_url.or_else(|| {
                    store
                        .bucket
                        .as_ref()
                        .map(|bucket| format!("s3://{}/load", bucket))
                }) {
                    Some(url) => url,
                    None => bail!(
                        "warehouse.stage_url must be set when the store is not a bucket"
                    ),
                };

                Some(WarehouseSettings {
                    account,
                    token,
                    database,
                    schema,
                    warehouse,
                    role: wh.role,
                    table,
                    stage,
                    stage_url,
                })
            }
        };

        Ok(Self {
            catalog,
            store,
            warehouse,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_file_config() -> FileConfig {
        toml::from_str(
            r#"
            [catalog]
            client_id = "id"
            client_secret = "secret"
            playlist_id = "37i9dQZF1DXcBWIGoYBM5M"

            [store]
            bucket = "trackhaul-staging"
            region = "eu-west-1"

            [warehouse]
            account = "acme-analytics"
            token = "pat-token"
            database = "MUSIC"
            schema = "PUBLIC"
            warehouse = "LOAD_WH"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_full_config_with_defaults() {
        let config = AppConfig::resolve(&CliConfig::default(), Some(full_file_config())).unwrap();

        assert_eq!(config.catalog.playlist_id, "37i9dQZF1DXcBWIGoYBM5M");
        assert_eq!(config.store.bucket.as_deref(), Some("trackhaul-staging"));

        let wh = config.warehouse.unwrap();
        assert_eq!(wh.table, "track_features");
        assert_eq!(wh.stage, "track_features_stage");
        assert_eq!(wh.stage_url, "s3://trackhaul-staging/load");
        assert_eq!(wh.role, None);
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = CliConfig {
            playlist_id: Some("override-playlist".to_string()),
            table: Some("weekly_features".to_string()),
        };
        let config = AppConfig::resolve(&cli, Some(full_file_config())).unwrap();

        assert_eq!(config.catalog.playlist_id, "override-playlist");
        let wh = config.warehouse.unwrap();
        assert_eq!(wh.table, "weekly_features");
        assert_eq!(wh.stage, "weekly_features_stage");
    }

    #[test]
    fn test_missing_catalog_credentials_fail() {
        let file: FileConfig = toml::from_str(
            r#"
            [store]
            local_dir = "/tmp/trackhaul"
            "#,
        )
        .unwrap();
        assert!(AppConfig::resolve(&CliConfig::default(), Some(file)).is_err());
    }

    #[test]
    fn test_store_backends_are_mutually_exclusive() {
        let file: FileConfig = toml::from_str(
            r#"
            [catalog]
            client_id = "id"
            client_secret = "secret"
            playlist_id = "p"

            [store]
            bucket = "b"
            local_dir = "/tmp/d"
            "#,
        )
        .unwrap();
        assert!(AppConfig::resolve(&CliConfig::default(), Some(file)).is_err());
    }

    #[test]
    fn test_warehouse_section_is_optional() {
        let file: FileConfig = toml::from_str(
            r#"
            [catalog]
            client_id = "id"
            client_secret = "secret"
            playlist_id = "p"

            [store]
            local_dir = "/tmp/trackhaul"
            "#,
        )
        .unwrap();
        let config = AppConfig::resolve(&CliConfig::default(), Some(file)).unwrap();
        assert!(config.warehouse.is_none());
    }

    #[test]
    fn test_local_store_without_stage_url_rejects_warehouse() {
        let file: FileConfig = toml::from_str(
            r#"
            [catalog]
            client_id = "id"
            client_secret = "secret"
            playlist_id = "p"

            [store]
            local_dir = "/tmp/trackhaul"

            [warehouse]
            account = "acme"
            token = "t"
            database = "D"
            schema = "S"
            warehouse = "W"
            "#,
        )
        .unwrap();
        assert!(AppConfig::resolve(&CliConfig::default(), Some(file)).is_err());
    }
}
