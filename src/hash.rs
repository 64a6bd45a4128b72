//! 带 pepper 的哈希门面
//!
//! [`Hash`] 包装一个共享的 [`Hasher`]，在哈希前把任意可序列化的输入规范化为
//! 字符串并追加应用级 pepper。
//!
//! ## 示例
//!
//! ```rust
//! use hashkit::hash::Hash;
//! use hashkit::hasher::{Blowfish, HashOptions};
//!
//! let hash = Hash::new(Blowfish::with_work_factor(4).unwrap(), "application-pepper");
//!
//! let encoded = hash.hash(&("user@example.com", 42), &HashOptions::default()).unwrap();
//! assert!(hash.verify(&("user@example.com", 42), &encoded, &HashOptions::default()).unwrap());
//! assert!(!hash.verify(&("user@example.com", 43), &encoded, &HashOptions::default()).unwrap());
//!
//! // 通过共享的 hasher 调整参数，之后的调用立即生效
//! hash.hasher().set_work_factor(5).unwrap();
//! let encoded = hash.hash("foo", &HashOptions::default()).unwrap();
//! assert!(encoded.starts_with("$2y$05$"));
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use zeroize::Zeroizing;

use crate::canonical::to_canonical_string;
use crate::error::Result;
use crate::hasher::crypt::MAX_INPUT_LENGTH;
use crate::hasher::{Blowfish, HashOptions, Hasher};
use crate::random::constant_time_compare_str;

/// 带 pepper 的哈希门面
///
/// hasher 以 `Arc` 共享持有，通过 [`hasher`](Self::hasher) 修改的参数对门面可见。
/// pepper 在整个生命周期内不变，释放时清零。
pub struct Hash<H: Hasher + ?Sized = Blowfish> {
    hasher: Arc<H>,
    pepper: Zeroizing<String>,
}

impl<H: Hasher> Hash<H> {
    /// 创建门面
    ///
    /// # Arguments
    ///
    /// * `hasher` - 具体的哈希器
    /// * `pepper` - 应用级密钥，追加在每个输入之后
    pub fn new(hasher: H, pepper: impl Into<String>) -> Self {
        Self::from_shared(Arc::new(hasher), pepper)
    }
}

impl<H: Hasher + ?Sized> Hash<H> {
    /// 使用已共享的 hasher 创建门面
    ///
    /// 多个门面可以共用同一个 hasher，参数修改对所有持有者可见。
    pub fn from_shared(hasher: Arc<H>, pepper: impl Into<String>) -> Self {
        Self {
            hasher,
            pepper: Zeroizing::new(pepper.into()),
        }
    }

    /// 共享的 hasher，用于直接调整参数
    pub fn hasher(&self) -> &Arc<H> {
        &self.hasher
    }

    /// 将输入规范化为字符串并追加 pepper
    ///
    /// 相同的逻辑值在任何时候都得到相同的结果。
    ///
    /// ```rust
    /// use hashkit::hash::Hash;
    /// use hashkit::hasher::Blowfish;
    ///
    /// let hash = Hash::new(Blowfish::with_work_factor(4).unwrap(), "pepper");
    /// assert_eq!(hash.serialize("foo").unwrap(), "\"foo\"pepper");
    /// assert_eq!(hash.serialize(&[1, 2]).unwrap(), "[1,2]pepper");
    /// ```
    pub fn serialize<T: Serialize + ?Sized>(&self, input: &T) -> Result<String> {
        let mut serialized = to_canonical_string(input)?;
        serialized.push_str(&self.pepper);
        Ok(serialized)
    }

    /// 哈希任意可序列化的输入
    ///
    /// bcrypt 只使用前 [`MAX_INPUT_LENGTH`] 字节，pepper 位于输入之后，
    /// 因此过长的输入会让 pepper 部分或全部失效，此时记录一条 debug 日志。
    pub fn hash<T: Serialize + ?Sized>(&self, input: &T, options: &HashOptions) -> Result<String> {
        let serialized = Zeroizing::new(self.serialize(input)?);

        let input_len = serialized.len() - self.pepper.len();
        let ignored = ignored_pepper_bytes(input_len, self.pepper.len());
        if ignored > 0 {
            tracing::debug!(
                input_len,
                ignored_pepper_bytes = ignored,
                pepper_ignored = input_len >= MAX_INPUT_LENGTH,
                "serialized input exceeds the bcrypt input limit; pepper is truncated"
            );
        }

        self.hasher.hash(&serialized, options)
    }

    /// 校验输入是否与已有哈希匹配
    pub fn verify<T: Serialize + ?Sized>(
        &self,
        input: &T,
        encoded: &str,
        options: &HashOptions,
    ) -> Result<bool> {
        let serialized = Zeroizing::new(self.serialize(input)?);
        self.hasher.verify(&serialized, encoded, options)
    }
}

impl Hash {
    /// 常量时间字符串比较
    ///
    /// 与 hasher 类型无关，等价于 [`constant_time_compare_str`]。
    ///
    /// ```rust
    /// use hashkit::hash::Hash;
    ///
    /// assert!(Hash::compare("abc", "abc"));
    /// assert!(!Hash::compare("abc", "abd"));
    /// ```
    pub fn compare(a: &str, b: &str) -> bool {
        constant_time_compare_str(a, b)
    }
}

/// pepper 中超出 bcrypt 输入上限而被忽略的字节数
fn ignored_pepper_bytes(input_len: usize, pepper_len: usize) -> usize {
    (input_len + pepper_len)
        .saturating_sub(MAX_INPUT_LENGTH)
        .min(pepper_len)
}

impl<H: Hasher + ?Sized> Clone for Hash<H> {
    fn clone(&self) -> Self {
        Self {
            hasher: Arc::clone(&self.hasher),
            pepper: self.pepper.clone(),
        }
    }
}

impl<H: Hasher + fmt::Debug + ?Sized> fmt::Debug for Hash<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hash")
            .field("hasher", &self.hasher)
            .field("pepper", &"[REDACTED]")
            .finish()
    }
}
