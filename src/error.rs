//! 统一错误类型模块
//!
//! 提供 hashkit 库中所有操作的错误类型定义。

use std::fmt;

/// hashkit 库的统一结果类型
pub type Result<T> = std::result::Result<T, Error>;

/// hashkit 库的错误类型
#[derive(Debug)]
pub enum Error {
    /// 哈希原语错误
    PasswordHash(PasswordHashError),

    /// 参数校验错误
    Validation(ValidationError),

    /// 加密错误
    Crypto(CryptoError),

    /// 输入序列化失败
    Serialization(String),

    /// 内部错误
    Internal(String),
}

impl Error {
    /// 创建一个内部错误
    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }

    /// 是否为参数校验错误
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// 是否为哈希原语不可用错误
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Error::PasswordHash(PasswordHashError::Unavailable(_)))
    }
}

/// 哈希原语相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasswordHashError {
    /// 哈希生成失败
    HashFailed(String),
    /// 无效的哈希或参数格式
    InvalidFormat(String),
    /// 算法变体不支持
    UnsupportedAlgorithm(String),
    /// 当前平台上哈希原语不可用
    Unavailable(String),
}

/// 参数校验相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// work factor 超出允许范围
    WorkFactorOutOfRange { min: u32, max: u32, actual: u32 },
    /// 自定义验证错误
    Custom(String),
}

/// 加密相关错误
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// 随机数生成失败
    RngFailed(String),
}

// ============================================================================
// Display 实现
// ============================================================================

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::PasswordHash(e) => write!(f, "Password hash error: {}", e),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Crypto(e) => write!(f, "Crypto error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl fmt::Display for PasswordHashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PasswordHashError::HashFailed(msg) => write!(f, "hash generation failed: {}", msg),
            PasswordHashError::InvalidFormat(msg) => write!(f, "invalid hash format: {}", msg),
            PasswordHashError::UnsupportedAlgorithm(alg) => {
                write!(f, "unsupported algorithm: {}", alg)
            }
            PasswordHashError::Unavailable(msg) => {
                write!(f, "hashing primitive unavailable: {}", msg)
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::WorkFactorOutOfRange { min, max, actual } => {
                write!(
                    f,
                    "work factor must be between {} and {}, got {}",
                    min, max, actual
                )
            }
            ValidationError::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::RngFailed(msg) => write!(f, "random number generation failed: {}", msg),
        }
    }
}

// ============================================================================
// std::error::Error 实现
// ============================================================================

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::PasswordHash(e) => Some(e),
            Error::Validation(e) => Some(e),
            Error::Crypto(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for PasswordHashError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for CryptoError {}

// ============================================================================
// From 实现 - 方便错误转换
// ============================================================================

impl From<PasswordHashError> for Error {
    fn from(err: PasswordHashError) -> Self {
        Error::PasswordHash(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<CryptoError> for Error {
    fn from(err: CryptoError) -> Self {
        Error::Crypto(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Serialization(msg.to_string())
    }
}
