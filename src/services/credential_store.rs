//! API key 存储 - 业务能力层
//!
//! 单一命名槽位，只提供 get / set / clear。
//! 解析流程只读取，写入来自用户的显式操作。

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use thiserror::Error;
use tracing::{debug, info};

/// 存储槽位名
pub const CREDENTIAL_SLOT: &str = "USER_API_KEY";

/// 不透明的访问凭据
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// 去掉首尾空白，空白值返回错误
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StoreError::BlankCredential);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(***)")
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("API key 不能为空")]
    BlankCredential,
    #[error("读写凭据文件失败 ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("凭据文件格式错误 ({path}): {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 凭据存储能力
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Option<Credential>, StoreError>;
    fn set(&self, raw: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;

    fn is_configured(&self) -> bool {
        matches!(self.get(), Ok(Some(_)))
    }
}

/// 内存存储（测试与临时会话）
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(raw: &str) -> Result<Self, StoreError> {
        let credential = Credential::parse(raw)?;
        Ok(Self {
            slot: RwLock::new(Some(credential)),
        })
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<Credential>, StoreError> {
        Ok(self.slot.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn set(&self, raw: &str) -> Result<(), StoreError> {
        let credential = Credential::parse(raw)?;
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(credential);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// 文件存储
///
/// JSON 键值文件，凭据保存在 `USER_API_KEY` 槽位，其它键原样保留。
///
/// 首次读取后槽位缓存在内存中，之后的 `get` 不再读盘；
/// `set` / `clear` 写盘后同步更新缓存。
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    /// `None` 表示尚未读盘
    slot: Mutex<Option<Option<Credential>>>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path_str(),
                    source,
                })
            }
        };

        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
            path: self.path_str(),
            source,
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(map).map_err(|source| StoreError::Corrupt {
            path: self.path_str(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path_str(),
            source,
        })
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self) -> Result<Option<Credential>, StoreError> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = slot.as_ref() {
            return Ok(cached.clone());
        }

        let map = self.read_map()?;
        let credential = map
            .get(CREDENTIAL_SLOT)
            .and_then(|raw| Credential::parse(raw).ok());
        debug!("已从 {} 读取 API key 槽位", self.path.display());

        *slot = Some(credential.clone());
        Ok(credential)
    }

    fn set(&self, raw: &str) -> Result<(), StoreError> {
        let credential = Credential::parse(raw)?;
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());

        let mut map = self.read_map()?;
        map.insert(CREDENTIAL_SLOT.to_string(), credential.expose().to_string());
        self.write_map(&map)?;
        *slot = Some(Some(credential));

        info!("✓ 已保存 API key 到 {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());

        let mut map = self.read_map()?;
        if map.remove(CREDENTIAL_SLOT).is_none() {
            debug!("凭据文件中没有 API key，无需清除");
            *slot = Some(None);
            return Ok(());
        }
        self.write_map(&map)?;
        *slot = Some(None);

        info!("🧹 已清除 API key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> FileCredentialStore {
        let path = std::env::temp_dir().join(format!(
            "math_guru_cred_{}_{}.json",
            std::process::id(),
            name
        ));
        let _ = fs::remove_file(&path);
        FileCredentialStore::new(path)
    }

    #[test]
    fn test_credential_is_trimmed_and_redacted() {
        let credential = Credential::parse("  abc123  ").unwrap();
        assert_eq!(credential.expose(), "abc123");
        assert_eq!(format!("{:?}", credential), "Credential(***)");
    }

    #[test]
    fn test_blank_credential_is_rejected() {
        assert!(matches!(
            Credential::parse("   "),
            Err(StoreError::BlankCredential)
        ));
    }

    #[test]
    fn test_memory_store_lifecycle() {
        let store = MemoryCredentialStore::new();
        assert!(store.get().unwrap().is_none());
        assert!(!store.is_configured());

        store.set("key-1").unwrap();
        assert_eq!(store.get().unwrap().unwrap().expose(), "key-1");

        assert!(store.set("").is_err());
        assert_eq!(store.get().unwrap().unwrap().expose(), "key-1");

        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn test_file_store_lifecycle() {
        let store = temp_store("lifecycle");
        assert!(store.get().unwrap().is_none());

        store.set(" file-key ").unwrap();
        assert_eq!(store.get().unwrap().unwrap().expose(), "file-key");

        let reopened = FileCredentialStore::new(store.path().to_path_buf());
        assert!(reopened.is_configured());

        store.clear().unwrap();
        assert!(store.get().unwrap().is_none());
        store.clear().unwrap();

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let store = temp_store("other_keys");
        fs::write(store.path(), r#"{"THEME": "dark"}"#).unwrap();

        store.set("k").unwrap();
        store.clear().unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("THEME"));
        assert!(!content.contains(CREDENTIAL_SLOT));

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_file_store_reads_disk_once() {
        let store = temp_store("cached");
        fs::write(store.path(), r#"{"USER_API_KEY": "first"}"#).unwrap();
        assert_eq!(store.get().unwrap().unwrap().expose(), "first");

        // 外部改写文件不影响已缓存的槽位
        fs::write(store.path(), r#"{"USER_API_KEY": "second"}"#).unwrap();
        assert_eq!(store.get().unwrap().unwrap().expose(), "first");

        store.set("third").unwrap();
        assert_eq!(store.get().unwrap().unwrap().expose(), "third");

        let _ = fs::remove_file(store.path());
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let store = temp_store("corrupt");
        fs::write(store.path(), "not json").unwrap();

        assert!(matches!(store.get(), Err(StoreError::Corrupt { .. })));

        let _ = fs::remove_file(store.path());
    }
}
