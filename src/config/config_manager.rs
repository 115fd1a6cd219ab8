// ==========================================
// 印花工坊排程引擎 - 配置管理器
// ==========================================
// 职责: 按优先级定位并加载工坊配置
// 优先级: 显式路径 > 环境变量 > 用户配置目录 > 内置默认
// ==========================================

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::shop_config::ShopConfig;

// ==========================================
// 配置来源
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Builtin,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: ShopConfig,
    source: ConfigSource,
}

impl ConfigManager {
    /// 按优先级加载配置
    ///
    /// # 参数
    /// - explicit_path: 命令行等显式指定的配置文件, 指定后文件必须存在
    ///
    /// # 说明
    /// 环境变量指向的文件同样必须存在; 用户配置目录下的文件缺失时回落到内置默认
    pub fn load(explicit_path: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        if let Ok(env_path) = std::env::var(config_keys::CONFIG_PATH_ENV) {
            if !env_path.trim().is_empty() {
                tracing::info!(env = config_keys::CONFIG_PATH_ENV, path = %env_path, "使用环境变量指定的配置");
                return Self::from_file(Path::new(env_path.trim()));
            }
        }

        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
            tracing::debug!(path = %path.display(), "用户配置不存在，使用内置默认工坊");
        }

        Ok(Self::builtin())
    }

    /// 从配置文件加载
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = ShopConfig::from_json_str(&raw)?;

        tracing::info!(
            path = %path.display(),
            methods = config.methods.len(),
            "工坊配置加载完成"
        );

        Ok(Self {
            config,
            source: ConfigSource::File(path.to_path_buf()),
        })
    }

    /// 使用内置默认工坊
    pub fn builtin() -> Self {
        Self {
            config: ShopConfig::builtin(),
            source: ConfigSource::Builtin,
        }
    }

    /// 用户配置目录下的默认配置路径
    ///
    /// 例如 Linux: ~/.config/print-shop-scheduler/shop.json
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(config_keys::APP_DIR_NAME)
                .join(config_keys::CONFIG_FILE_NAME)
        })
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    pub fn into_config(self) -> ShopConfig {
        self.config
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 配置文件路径环境变量
    pub const CONFIG_PATH_ENV: &str = "PRINT_SHOP_CONFIG";

    // 用户配置目录
    pub const APP_DIR_NAME: &str = "print-shop-scheduler";
    pub const CONFIG_FILE_NAME: &str = "shop.json";
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_file_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        let raw = serde_json::to_string_pretty(&ShopConfig::builtin()).unwrap();
        file.write_all(raw.as_bytes()).unwrap();

        let manager = ConfigManager::load(Some(file.path())).unwrap();
        assert_eq!(manager.config(), &ShopConfig::builtin());
        assert_eq!(manager.source(), &ConfigSource::File(file.path().to_path_buf()));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let result = ConfigManager::load(Some(Path::new("/nonexistent/print-shop/shop.json")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let result = ConfigManager::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_default_path_layout() {
        if let Some(path) = ConfigManager::default_config_path() {
            assert!(path.ends_with("print-shop-scheduler/shop.json"));
        }
    }
}
