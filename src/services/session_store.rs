//! 会话存储服务 - 业务能力层
//!
//! 在键值存储之上提供"会话标识"和"缓存结果"两种能力

use crate::error::StorageError;
use crate::infrastructure::KeyValueStore;
use crate::models::{ScoringResult, SessionId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 会话标识的键
pub const SESSION_KEY: &str = "uuid";
/// 缓存结果的键
pub const RESULTS_KEY: &str = "testResults";

/// 会话存储
///
/// 程序启动时创建一次，克隆后传给各个流程
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 保存会话标识
    pub fn save(&self, session: &SessionId) -> Result<(), StorageError> {
        debug!("保存会话标识 {}", session);
        self.store.set(SESSION_KEY, session.as_str())
    }

    /// 读取会话标识，空字符串视为不存在
    pub fn load(&self) -> Result<Option<SessionId>, StorageError> {
        Ok(self
            .store
            .get(SESSION_KEY)?
            .filter(|id| !id.trim().is_empty())
            .map(SessionId::new))
    }

    /// 缓存测试结果，刷新页面（重启程序）后仍可显示
    pub fn cache_result(&self, result: &ScoringResult) -> Result<(), StorageError> {
        let json = serde_json::to_string(result)?;
        self.store.set(RESULTS_KEY, &json)
    }

    /// 读取缓存的测试结果
    ///
    /// 缓存内容损坏时删除该键并返回 `None`
    pub fn load_cached_result(&self) -> Result<Option<ScoringResult>, StorageError> {
        let Some(json) = self.store.get(RESULTS_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_str::<ScoringResult>(&json) {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                warn!("⚠️ 缓存的测试结果无法解析，已丢弃: {}", e);
                self.store.remove(RESULTS_KEY)?;
                Ok(None)
            }
        }
    }

    /// 清除会话标识与缓存结果
    pub fn clear(&self) -> Result<(), StorageError> {
        info!("🧹 清除会话数据");
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;
    use crate::models::{Faculty, FacultyType};

    fn session_store() -> (Arc<MemoryStore>, SessionStore) {
        let raw = Arc::new(MemoryStore::new());
        let store = SessionStore::new(raw.clone());
        (raw, store)
    }

    fn sample_result() -> ScoringResult {
        ScoringResult {
            faculty_type: vec![FacultyType {
                name: "Человек-природа".to_string(),
                compliance: 40.0,
                faculties: vec![Faculty {
                    name: "Агрономический".to_string(),
                    url: "https://example.org/agro".to_string(),
                }],
            }],
            exams: Vec::new(),
        }
    }

    #[test]
    fn test_save_and_load_session() {
        let (_, store) = session_store();
        assert_eq!(store.load().unwrap(), None);

        store.save(&SessionId::new("u-1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(SessionId::new("u-1")));
    }

    #[test]
    fn test_blank_session_is_absent() {
        let (raw, store) = session_store();
        raw.set(SESSION_KEY, "  ").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_cached_result_round_trip() {
        let (_, store) = session_store();
        store.cache_result(&sample_result()).unwrap();
        assert_eq!(store.load_cached_result().unwrap(), Some(sample_result()));
    }

    #[test]
    fn test_malformed_cache_is_discarded() {
        let (raw, store) = session_store();
        raw.set(RESULTS_KEY, "{\"faculty_type\": [").unwrap();

        assert_eq!(store.load_cached_result().unwrap(), None);
        assert_eq!(raw.get(RESULTS_KEY).unwrap(), None);
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let (raw, store) = session_store();
        store.save(&SessionId::new("u-1")).unwrap();
        store.cache_result(&sample_result()).unwrap();

        store.clear().unwrap();

        assert_eq!(raw.get(SESSION_KEY).unwrap(), None);
        assert_eq!(raw.get(RESULTS_KEY).unwrap(), None);
    }
}
