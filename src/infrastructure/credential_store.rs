//! 凭据存储 - 基础设施层
//!
//! 持有 PageSpeed API Key，查找顺序由提供者列表决定：先内存，后持久化文件

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{AppResult, CredentialError};

/// 持久化文件中保存 API Key 的键名
pub const API_KEY_STORAGE_KEY: &str = "pagespeed_api_key";

/// 凭据提供者
pub trait CredentialProvider: Send + Sync {
    /// 提供者名称（仅用于日志）
    fn name(&self) -> &'static str;

    /// 读取 API Key，没有时返回 `None`
    fn api_key(&self) -> AppResult<Option<String>>;
}

/// 进程内保存的 API Key（本次运行有效）
#[derive(Debug, Default)]
pub struct MemoryCredential {
    value: RwLock<Option<String>>,
}

impl MemoryCredential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>) {
        let mut value = self.value.write().unwrap_or_else(|e| e.into_inner());
        *value = Some(key.into());
    }

    pub fn clear(&self) {
        let mut value = self.value.write().unwrap_or_else(|e| e.into_inner());
        *value = None;
    }
}

impl CredentialProvider for MemoryCredential {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn api_key(&self) -> AppResult<Option<String>> {
        let value = self.value.read().unwrap_or_else(|e| e.into_inner());
        Ok(value.clone())
    }
}

/// 基于 JSON 文件的键值存储
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 写入 API Key
    pub fn set(&self, key: &str) -> AppResult<()> {
        let mut entries = self.load()?;
        entries.insert(API_KEY_STORAGE_KEY.to_string(), key.to_string());
        self.save(&entries)
    }

    /// 删除 API Key，文件中的其他键保留
    pub fn clear(&self) -> AppResult<()> {
        let mut entries = self.load()?;
        if entries.remove(API_KEY_STORAGE_KEY).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }

    fn load(&self) -> AppResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            CredentialError::ReadFailed {
                path: self.path.clone(),
                source,
            }
        })?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        let entries = serde_json::from_str(&content).map_err(|source| {
            CredentialError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(entries)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        let write_failed = |source| CredentialError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let content = serde_json::to_string_pretty(entries).map_err(|source| {
            CredentialError::Malformed {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, content).map_err(write_failed)?;
        Ok(())
    }
}

impl CredentialProvider for FileCredentialStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn api_key(&self) -> AppResult<Option<String>> {
        Ok(self.load()?.remove(API_KEY_STORAGE_KEY))
    }
}

/// 从环境变量读取 API Key
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialProvider for EnvCredential {
    fn name(&self) -> &'static str {
        "env"
    }

    fn api_key(&self) -> AppResult<Option<String>> {
        Ok(std::env::var(&self.var).ok())
    }
}

/// 凭据服务
///
/// 注入给实时数据源使用，提供 get / set / clear
pub struct CredentialService {
    memory: Arc<MemoryCredential>,
    store: Arc<FileCredentialStore>,
    providers: Vec<Arc<dyn CredentialProvider>>,
}

impl CredentialService {
    /// 默认查找顺序：内存 → 文件
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        let memory = Arc::new(MemoryCredential::new());
        let store = Arc::new(FileCredentialStore::new(store_path));
        let providers: Vec<Arc<dyn CredentialProvider>> = vec![memory.clone(), store.clone()];

        Self {
            memory,
            store,
            providers,
        }
    }

    /// 在默认提供者之后追加一个提供者
    pub fn with_provider(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// 依次询问提供者，返回第一个非空值
    pub fn get(&self) -> AppResult<Option<String>> {
        for provider in &self.providers {
            if let Some(key) = provider.api_key()? {
                let key = key.trim();
                if !key.is_empty() {
                    debug!("使用来自 {} 的 API Key", provider.name());
                    return Ok(Some(key.to_string()));
                }
            }
        }
        Ok(None)
    }

    pub fn is_configured(&self) -> AppResult<bool> {
        Ok(self.get()?.is_some())
    }

    /// 保存并持久化 API Key
    pub fn set(&self, key: &str) -> AppResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CredentialError::EmptyKey.into());
        }
        self.store.set(key)?;
        self.memory.set(key);
        Ok(())
    }

    /// 只在本次运行中使用，不写入文件
    pub fn set_session(&self, key: &str) -> AppResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(CredentialError::EmptyKey.into());
        }
        self.memory.set(key);
        Ok(())
    }

    /// 同时清除内存和文件中的 API Key
    pub fn clear(&self) -> AppResult<()> {
        self.memory.clear();
        self.store.clear()
    }

    pub fn store_path(&self) -> &Path {
        self.store.path()
    }
}
