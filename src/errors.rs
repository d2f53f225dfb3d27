use thiserror::Error;

/// 容器错误类型
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 键上已有服务实例，拒绝再次注册
    #[error("Entry '{key}' already holds a service instance")]
    DuplicateInstance { key: String },

    /// 别名链中出现重复的键
    #[error("Cyclic alias detected at '{key}'")]
    CyclicAlias { key: String },

    /// 解析后的键既没有实例也没有提供者
    #[error("Entry '{key}' not found")]
    EntryNotFound { key: String },

    /// 工厂返回了错误
    #[error("Provider for '{key}' failed: {source}")]
    ProviderFailed {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// 实例无法转换为请求的类型
    #[error("Entry '{key}' is not of type {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// 提供者在同一线程内再次请求正在创建的键
    #[error("Circular dependency while providing '{key}'")]
    CircularDependency { key: String },
}

impl ContainerError {
    /// 出错的键
    pub fn key(&self) -> &str {
        match self {
            ContainerError::DuplicateInstance { key }
            | ContainerError::CyclicAlias { key }
            | ContainerError::EntryNotFound { key }
            | ContainerError::ProviderFailed { key, .. }
            | ContainerError::TypeMismatch { key, .. }
            | ContainerError::CircularDependency { key } => key,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}
