use serde::Deserialize;
use std::collections::HashMap;

use crate::service::Service;

/// 变量上下文，存储所有可用变量
#[derive(Debug, Clone, Default)]
pub struct VariableContext {
    /// 变量映射表
    variables: HashMap<String, String>,
}

impl VariableContext {
    /// 创建新的空变量上下文
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入变量
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// 获取变量值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(|s| s.as_str())
    }

    /// 按布尔值读取变量，无法解析时返回 None
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
    }

    /// 批量插入变量
    pub fn extend<I, K, V>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in vars {
            self.insert(key, value);
        }
    }

    /// 变量数量
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// 环境配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Environment {
    /// 变量映射
    #[serde(flatten)]
    pub variables: HashMap<String, String>,
}

/// rukite.toml 的完整内容
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RunConfig {
    /// 未指定服务的命令使用的服务名称
    #[serde(default)]
    pub default_service: Option<String>,

    /// 单次请求超时（秒）
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub services: HashMap<String, Service>,

    /// 自由设置，例如 logRequest
    #[serde(default)]
    pub settings: HashMap<String, String>,

    /// 所有环境配置
    #[serde(default)]
    pub environments: HashMap<String, Environment>,
}

impl RunConfig {
    /// 获取指定环境的变量
    pub fn get_environment(&self, env_name: &str) -> Option<&Environment> {
        self.environments.get(env_name)
    }
}
