//! 哈希器配置
//!
//! work factor 是唯一可调的哈希参数，取值范围 4-31。

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// 允许的最小 work factor
pub const MIN_WORK_FACTOR: u32 = 4;

/// 允许的最大 work factor
pub const MAX_WORK_FACTOR: u32 = 31;

/// 默认 work factor
pub const DEFAULT_WORK_FACTOR: u32 = bcrypt::DEFAULT_COST;

/// 哈希器配置
///
/// 可以直接嵌入宿主应用的配置文件中反序列化，缺省字段使用默认值。
///
/// ```rust
/// use hashkit::config::HasherConfig;
///
/// let config: HasherConfig = serde_json::from_str(r#"{"work_factor": 8}"#).unwrap();
/// assert_eq!(config.work_factor, 8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    /// bcrypt 的 cost 参数 (4-31)，每次哈希执行 2^work_factor 轮
    pub work_factor: u32,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            work_factor: DEFAULT_WORK_FACTOR,
        }
    }
}

impl HasherConfig {
    /// 创建默认配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置 work factor（不做校验，使用前调用 [`validate`](Self::validate)）
    pub fn with_work_factor(mut self, work_factor: u32) -> Self {
        self.work_factor = work_factor;
        self
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        validate_work_factor(self.work_factor)
    }
}

/// 校验 work factor 是否位于 [4, 31]
///
/// 超出范围直接拒绝，不做截断。
pub fn validate_work_factor(work_factor: u32) -> Result<()> {
    if (MIN_WORK_FACTOR..=MAX_WORK_FACTOR).contains(&work_factor) {
        Ok(())
    } else {
        Err(ValidationError::WorkFactorOutOfRange {
            min: MIN_WORK_FACTOR,
            max: MAX_WORK_FACTOR,
            actual: work_factor,
        }
        .into())
    }
}
