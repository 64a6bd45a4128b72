//! 哈希器模块
//!
//! 定义统一的 [`Hasher`] 契约，并提供基于 bcrypt 的 [`Blowfish`] 实现。
//!
//! ## 示例
//!
//! ```rust
//! use hashkit::hasher::{Blowfish, HashOptions, Hasher};
//!
//! let hasher = Blowfish::with_work_factor(4).unwrap();
//!
//! let hash = hasher.hash("my_password", &HashOptions::default()).unwrap();
//! assert!(hash.starts_with("$2y$04$"));
//!
//! assert!(hasher.verify("my_password", &hash, &HashOptions::default()).unwrap());
//! assert!(!hasher.verify("wrong_password", &hash, &HashOptions::default()).unwrap());
//! ```
//!
//! ### 指定 salt
//!
//! 任意字符串都可以作为 salt，非法的 salt 会被确定性地规范化：
//!
//! ```rust
//! use hashkit::hasher::{Blowfish, HashOptions, Hasher};
//!
//! let hasher = Blowfish::with_work_factor(4).unwrap();
//! let options = HashOptions::new().with_salt("salt");
//!
//! let first = hasher.hash("foo", &options).unwrap();
//! let second = hasher.hash("foo", &options).unwrap();
//! assert_eq!(first, second);
//! ```

mod blowfish;
pub mod crypt;
pub mod salt;

pub use blowfish::Blowfish;
pub use crypt::{HashDescriptor, Variant};
pub use salt::{Salt, derive_salt};

use std::sync::Arc;

use crate::error::Result;

/// 哈希选项
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HashOptions {
    /// 显式指定的 salt；为 `None` 时由原语随机生成
    pub salt: Option<String>,
}

impl HashOptions {
    /// 创建空选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定 salt
    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }
}

/// 统一的哈希器契约
///
/// 其它算法只要实现该 trait 就可以替换 [`Blowfish`] 交给
/// [`Hash`](crate::hash::Hash) 使用。
pub trait Hasher {
    /// 计算 `input` 的哈希串
    fn hash(&self, input: &str, options: &HashOptions) -> Result<String>;

    /// 校验 `input` 是否与 `encoded` 匹配
    ///
    /// 不匹配返回 `Ok(false)` 而不是错误。
    fn verify(&self, input: &str, encoded: &str, options: &HashOptions) -> Result<bool>;
}

impl<H: Hasher + ?Sized> Hasher for Arc<H> {
    fn hash(&self, input: &str, options: &HashOptions) -> Result<String> {
        (**self).hash(input, options)
    }

    fn verify(&self, input: &str, encoded: &str, options: &HashOptions) -> Result<bool> {
        (**self).verify(input, encoded, options)
    }
}

impl<H: Hasher + ?Sized> Hasher for &H {
    fn hash(&self, input: &str, options: &HashOptions) -> Result<String> {
        (**self).hash(input, options)
    }

    fn verify(&self, input: &str, encoded: &str, options: &HashOptions) -> Result<bool> {
        (**self).verify(input, encoded, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        assert_eq!(HashOptions::new().salt, None);
        assert_eq!(
            HashOptions::new().with_salt("salt").salt.as_deref(),
            Some("salt")
        );
    }

    #[test]
    fn test_trait_object() {
        let hasher: Arc<dyn Hasher> = Arc::new(Blowfish::with_work_factor(4).unwrap());
        let options = HashOptions::new().with_salt("trait-object");

        let hash = hasher.hash("secret", &options).unwrap();
        assert!(hasher.verify("secret", &hash, &options).unwrap());
        assert!(!hasher.verify("other", &hash, &options).unwrap());
    }

    #[test]
    fn test_reference_forwarding() {
        let blowfish = Blowfish::with_work_factor(4).unwrap();
        let by_ref = &blowfish;
        let options = HashOptions::new().with_salt("by-reference");

        assert_eq!(
            Hasher::hash(&by_ref, "secret", &options).unwrap(),
            blowfish.hash("secret", &options).unwrap()
        );
    }
}
