use crate::service::ServiceRegistry;
use crate::variable::resolver::VariableResolver;
use crate::variable::types::{RunConfig, VariableContext};
use crate::{Result, RukiteError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "rukite.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RukiteError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            RukiteError::Configuration(format!(
                "Failed to parse config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录
    /// 2. 父目录递归查找
    /// 3. 用户配置目录 ~/.config/rukite/
    ///
    /// 找不到时返回 None；找到但无法解析时返回错误
    pub fn find_and_load() -> Result<Option<RunConfig>> {
        let found = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::search_upwards(&dir))
            .or_else(Self::user_config_path);

        match found {
            Some(path) => {
                debug!("Loading config from {}", path.display());
                Self::load_from_path(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// 从给定目录开始逐级向上查找配置文件
    pub fn search_upwards(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    fn user_config_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("rukite").join(Self::CONFIG_FILE);
        config_path.exists().then_some(config_path)
    }

    /// 构建运行时设置
    /// 优先级：settings < 环境变量 < CLI 覆盖（--var key=value）
    pub fn build_settings(
        config: &RunConfig,
        env_name: Option<&str>,
        cli_vars: &[(String, String)],
    ) -> Result<VariableContext> {
        let mut context = VariableContext::new();

        for (key, value) in &config.settings {
            context.insert(key.clone(), VariableResolver::resolve_env_vars(value));
        }

        if let Some(name) = env_name {
            let env = config.get_environment(name).ok_or_else(|| {
                RukiteError::Configuration(format!("Environment {} is not defined", name))
            })?;
            for (key, value) in &env.variables {
                // 解析系统环境变量 ${VAR}
                context.insert(key.clone(), VariableResolver::resolve_env_vars(value));
            }
        }

        for (key, value) in cli_vars {
            context.insert(key.clone(), value.clone());
        }

        Ok(context)
    }

    /// 由配置构建服务注册表，default_service 必须指向已定义的服务
    ///
    /// 只定义了一个服务且未指定默认服务时，该服务即默认服务
    pub fn build_registry(config: &RunConfig) -> Result<ServiceRegistry> {
        let mut registry = ServiceRegistry::new();
        for (name, service) in &config.services {
            registry.register(name.clone(), service.clone());
        }

        match &config.default_service {
            Some(name) if config.services.contains_key(name) => registry.set_default(name.clone()),
            Some(name) => {
                return Err(RukiteError::Configuration(format!(
                    "Default service {} is not defined in [services]",
                    name
                )));
            }
            None if config.services.len() == 1 => {
                if let Some(name) = config.services.keys().next() {
                    registry.set_default(name.clone());
                }
            }
            None => {}
        }

        Ok(registry)
    }

    /// 解析 CLI 变量参数 "key=value"
    pub fn parse_cli_var(s: &str) -> Option<(String, String)> {
        s.split_once('=')
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    const CONFIG: &str = r#"
default_service = "api"

[services.api]
base_uri = "http://localhost:8080"

[services.billing]
base_uri = "http://billing.local"

[settings]
logRequest = "false"
token = "base-token"

[environments.dev]
token = "dev-token"

[environments.prod]
token = "${RUKITE_PROD_TOKEN}"
"#;

    #[test]
    fn test_load_from_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(CONFIG.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.services.len(), 2);
        assert_eq!(config.environments.len(), 2);
    }

    #[test]
    fn test_load_invalid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"default_service = [").unwrap();
        temp_file.flush().unwrap();

        assert!(matches!(
            ConfigLoader::load_from_path(temp_file.path()),
            Err(RukiteError::Configuration(_))
        ));
    }

    #[test]
    fn test_search_upwards() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(ConfigLoader::CONFIG_FILE), CONFIG).unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let found = ConfigLoader::search_upwards(&nested).unwrap();
        assert_eq!(found, dir.path().join(ConfigLoader::CONFIG_FILE));
    }

    #[test]
    fn test_build_settings() {
        let config: RunConfig = toml::from_str(CONFIG).unwrap();

        let context = ConfigLoader::build_settings(&config, None, &[]).unwrap();
        assert_eq!(context.get("token"), Some("base-token"));
        assert_eq!(context.get_bool("logRequest"), Some(false));

        let context = ConfigLoader::build_settings(&config, Some("dev"), &[]).unwrap();
        assert_eq!(context.get("token"), Some("dev-token"));

        // CLI 覆盖
        let cli_vars = vec![("token".to_string(), "custom-token".to_string())];
        let context = ConfigLoader::build_settings(&config, Some("dev"), &cli_vars).unwrap();
        assert_eq!(context.get("token"), Some("custom-token"));
    }

    #[test]
    fn test_build_settings_unknown_environment() {
        let config: RunConfig = toml::from_str(CONFIG).unwrap();
        assert!(matches!(
            ConfigLoader::build_settings(&config, Some("staging"), &[]),
            Err(RukiteError::Configuration(_))
        ));
    }

    #[test]
    fn test_build_registry() {
        let config: RunConfig = toml::from_str(CONFIG).unwrap();
        let registry = ConfigLoader::build_registry(&config).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.resolve(None).unwrap().base_uri,
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_build_registry_single_service_is_default() {
        let config: RunConfig = toml::from_str(
            r#"
[services.only]
base_uri = "http://only"
"#,
        )
        .unwrap();
        let registry = ConfigLoader::build_registry(&config).unwrap();
        assert_eq!(registry.resolve(None).unwrap().base_uri, "http://only");
    }

    #[test]
    fn test_build_registry_unknown_default() {
        let config: RunConfig = toml::from_str(
            r#"
default_service = "missing"

[services.api]
base_uri = "http://api"
"#,
        )
        .unwrap();
        assert!(matches!(
            ConfigLoader::build_registry(&config),
            Err(RukiteError::Configuration(_))
        ));
    }

    #[test]
    fn test_parse_cli_var() {
        assert_eq!(
            ConfigLoader::parse_cli_var("key=value"),
            Some(("key".to_string(), "value".to_string()))
        );

        assert_eq!(
            ConfigLoader::parse_cli_var("url=https://example.com?a=b"),
            Some(("url".to_string(), "https://example.com?a=b".to_string()))
        );

        assert_eq!(ConfigLoader::parse_cli_var("invalid"), None);
    }
}
