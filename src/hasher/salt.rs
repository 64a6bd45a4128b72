//! Salt 规范化
//!
//! bcrypt 只接受 22 个 `[./0-9A-Za-z]` 字符组成的 salt。任意字符串都会被确定性地
//! 转换为合法 salt：合法的原样返回，其余取 MD5 十六进制摘要的前 22 位。

use std::fmt;

use md5::{Digest, Md5};

use crate::random::hex_encode;

/// salt 字符数
pub const SALT_LENGTH: usize = 22;

/// 规范化后的 bcrypt salt
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Salt(String);

impl Salt {
    /// 将任意字符串转换为合法 salt
    ///
    /// 纯函数：相同输入永远得到相同输出。
    ///
    /// ```rust
    /// use hashkit::hasher::salt::Salt;
    ///
    /// let valid = "./A1aaaaaaaaaaaaaaaaaa";
    /// assert_eq!(Salt::derive(valid).as_str(), valid);
    ///
    /// let derived = Salt::derive("salt");
    /// assert_eq!(derived.as_str(), "ceb20772e0c9d240c75eb2");
    /// ```
    pub fn derive(raw: &str) -> Self {
        if Self::is_valid(raw) {
            return Self(raw.to_string());
        }

        let digest = hex_encode(&Md5::digest(raw.as_bytes()));
        Self(digest[..SALT_LENGTH].to_string())
    }

    /// 是否已经是合法 salt（长度 22，字符集 `[./0-9A-Za-z]`）
    pub fn is_valid(raw: &str) -> bool {
        raw.len() == SALT_LENGTH && raw.bytes().all(is_salt_char)
    }

    /// 获取 salt 字符串
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 转换为 `String`
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Salt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 便捷函数，等价于 [`Salt::derive`]
pub fn derive_salt(raw: &str) -> Salt {
    Salt::derive(raw)
}

/// bcrypt base64 字母表中的字符
pub(crate) fn is_salt_char(b: u8) -> bool {
    b == b'.' || b == b'/' || b.is_ascii_alphanumeric()
}
