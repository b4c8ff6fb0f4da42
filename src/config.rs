//! Runtime configuration, passed explicitly to `Rbac::open`

use serde::Deserialize;

use crate::error::{RbacError, Result};

pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the LMDB environment
    pub db_path: String,
    /// LMDB map size in bytes
    pub map_size: usize,
    /// Prefix applied to every table (named database)
    pub table_prefix: String,
    /// Listen address for the HTTP server
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: "data/menurbac".to_string(),
            map_size: DEFAULT_MAP_SIZE,
            table_prefix: String::new(),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    /// Config for a given database directory, everything else default
    pub fn with_path(db_path: impl Into<String>) -> Self {
        Config {
            db_path: db_path.into(),
            ..Config::default()
        }
    }

    /// Read overrides from `MENURBAC_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        if let Ok(v) = std::env::var("MENURBAC_DB_PATH") {
            config.db_path = v;
        }
        if let Ok(v) = std::env::var("MENURBAC_MAP_SIZE") {
            config.map_size = v
                .parse()
                .map_err(|_| RbacError::Config(format!("MENURBAC_MAP_SIZE: not a number: {v}")))?;
        }
        if let Ok(v) = std::env::var("MENURBAC_TABLE_PREFIX") {
            config.table_prefix = v;
        }
        if let Ok(v) = std::env::var("MENURBAC_BIND") {
            config.bind_addr = v;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.db_path.is_empty() {
            return Err(RbacError::Config("db_path is empty".into()));
        }
        if self.map_size == 0 {
            return Err(RbacError::Config("map_size must be positive".into()));
        }
        if !self
            .table_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(RbacError::Config(format!(
                "table_prefix may only contain [A-Za-z0-9_]: {}",
                self.table_prefix
            )));
        }
        Ok(())
    }

    /// Apply the table prefix to a table name
    pub fn table_name(&self, name: &str) -> String {
        format!("{}{}", self.table_prefix, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_names_are_prefixed() {
        let mut c = Config::with_path("/tmp/x");
        assert_eq!(c.table_name("menu"), "menu");
        c.table_prefix = "sys_".into();
        assert_eq!(c.table_name("menu"), "sys_menu");
    }

    #[test]
    fn rejects_bad_prefix() {
        let mut c = Config::with_path("/tmp/x");
        c.table_prefix = "a.b".into();
        assert!(matches!(c.validate(), Err(RbacError::Config(_))));
    }
}
