//! crypt 风格的 bcrypt 原语
//!
//! 在 `bcrypt` crate 之上实现 `crypt(secret, setting)` 语义：
//!
//! - `setting` 可以是参数前缀 `$2y$NN$<22 位 salt>$`，也可以是一个完整的哈希串，
//!   原语只读取其中的变体、work factor 与 salt；
//! - 输出为完整的 60 字符哈希串 `$2y$NN$<22 位 salt><31 位摘要>`。

use std::fmt;
use std::str::FromStr;

use base64::{
    Engine, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use bcrypt::Version;

use super::salt::{SALT_LENGTH, is_salt_char};
use crate::config::{MAX_WORK_FACTOR, MIN_WORK_FACTOR};
use crate::error::{PasswordHashError, Result};
use crate::random::generate_random_bytes;

/// 摘要部分的字符数
pub const DIGEST_LENGTH: usize = 31;

/// 完整哈希串的字符数
pub const HASH_LENGTH: usize = 60;

/// bcrypt 实际使用的输入字节数，超出部分被忽略
pub const MAX_INPUT_LENGTH: usize = 72;

/// `$2y$NN$` 前缀长度
const PREFIX_LENGTH: usize = 7;

/// 原始 salt 字节数
const SALT_BYTES: usize = 16;

/// bcrypt 使用的 base64 字母表；22 个字符的最后一位只有高 2 位有效
const SALT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

/// bcrypt 哈希串的变体标识
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// `$2a$`
    TwoA,
    /// `$2b$`
    TwoB,
    /// `$2y$`，默认输出的变体
    TwoY,
}

impl Variant {
    /// 标识符，例如 `2y`
    pub fn ident(&self) -> &'static str {
        match self {
            Variant::TwoA => "2a",
            Variant::TwoB => "2b",
            Variant::TwoY => "2y",
        }
    }

    fn from_byte(b: u8) -> Result<Self> {
        match b {
            b'a' => Ok(Variant::TwoA),
            b'b' => Ok(Variant::TwoB),
            b'y' => Ok(Variant::TwoY),
            b'x' => Err(PasswordHashError::UnsupportedAlgorithm("$2x$".to_string()).into()),
            other => Err(invalid_format(format!(
                "unknown bcrypt variant '{}'",
                other.escape_ascii()
            ))),
        }
    }

    fn version(&self) -> Version {
        match self {
            Variant::TwoA => Version::TwoA,
            Variant::TwoB => Version::TwoB,
            Variant::TwoY => Version::TwoY,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ident())
    }
}

// ============================================================================
// Setting
// ============================================================================

/// 从参数串或完整哈希串中解析出的原语参数
#[derive(Debug, Clone, PartialEq, Eq)]
struct Setting {
    variant: Variant,
    work_factor: u32,
    salt: [u8; SALT_BYTES],
}

impl Setting {
    /// 只解析前 29 个字符，其后的内容（`$` 或摘要）被忽略
    fn parse(setting: &str) -> Result<Self> {
        let bytes = setting.as_bytes();
        if bytes.len() < PREFIX_LENGTH + SALT_LENGTH {
            return Err(invalid_format("setting is too short"));
        }
        if bytes[0] != b'$' || bytes[1] != b'2' || bytes[3] != b'$' || bytes[6] != b'$' {
            return Err(invalid_format("expected a $2?$NN$ prefix"));
        }

        let variant = Variant::from_byte(bytes[2])?;
        let work_factor = parse_work_factor(bytes[4], bytes[5])?;

        let encoded_salt = &bytes[PREFIX_LENGTH..PREFIX_LENGTH + SALT_LENGTH];
        if !encoded_salt.iter().copied().all(is_salt_char) {
            return Err(invalid_format("salt contains characters outside [./0-9A-Za-z]"));
        }

        let decoded = SALT_ENGINE
            .decode(encoded_salt)
            .map_err(|e| invalid_format(format!("salt decoding failed: {}", e)))?;
        let salt: [u8; SALT_BYTES] = decoded
            .try_into()
            .map_err(|_| invalid_format("salt must decode to 16 bytes"))?;

        Ok(Self {
            variant,
            work_factor,
            salt,
        })
    }
}

fn parse_work_factor(tens: u8, ones: u8) -> Result<u32> {
    if !tens.is_ascii_digit() || !ones.is_ascii_digit() {
        return Err(invalid_format("work factor must be two digits"));
    }
    let work_factor = u32::from(tens - b'0') * 10 + u32::from(ones - b'0');
    if !(MIN_WORK_FACTOR..=MAX_WORK_FACTOR).contains(&work_factor) {
        return Err(invalid_format(format!(
            "work factor {} outside {}-{}",
            work_factor, MIN_WORK_FACTOR, MAX_WORK_FACTOR
        )));
    }
    Ok(work_factor)
}

fn invalid_format(msg: impl Into<String>) -> crate::error::Error {
    PasswordHashError::InvalidFormat(msg.into()).into()
}

// ============================================================================
// 原语
// ============================================================================

/// 以 `setting` 为参数计算 bcrypt 哈希
///
/// `setting` 可以是 `$2y$NN$<salt>$` 形式的参数串，也可以是已有的完整哈希串。
/// 输出保留 `setting` 中的变体标识。
///
/// ```rust
/// use hashkit::hasher::crypt::crypt;
///
/// let hash = crypt(b"U*U", "$2y$05$CCCCCCCCCCCCCCCCCCCCC.").unwrap();
/// assert_eq!(hash, "$2y$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW");
///
/// // 传入完整哈希串会复用其中的参数
/// assert_eq!(crypt(b"U*U", &hash).unwrap(), hash);
/// ```
pub fn crypt(secret: &[u8], setting: &str) -> Result<String> {
    let setting = Setting::parse(setting)?;

    // 超过 MAX_INPUT_LENGTH 的部分会被 bcrypt 忽略
    let parts = bcrypt::hash_with_salt(secret, setting.work_factor, setting.salt).map_err(|e| {
        PasswordHashError::HashFailed(format!("bcrypt hash failed: {}", e))
    })?;

    Ok(parts.format_for_version(setting.variant.version()))
}

/// 生成带随机 salt 的参数串 `$2y$NN$<salt>$`
pub fn gen_setting(work_factor: u32) -> Result<String> {
    crate::config::validate_work_factor(work_factor)?;
    let salt = generate_random_bytes(SALT_BYTES)?;
    Ok(format_setting(work_factor, &SALT_ENGINE.encode(salt)))
}

/// 拼接参数串 `$2y$NN$<salt>$`，调用方负责保证 salt 合法
pub(crate) fn format_setting(work_factor: u32, salt: &str) -> String {
    format!("${}${:02}${}$", Variant::TwoY, work_factor, salt)
}

// ============================================================================
// HashDescriptor
// ============================================================================

/// 已解析的完整 bcrypt 哈希串
///
/// ```rust
/// use hashkit::hasher::crypt::{HashDescriptor, Variant};
///
/// let descriptor: HashDescriptor = "$2y$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW"
///     .parse()
///     .unwrap();
/// assert_eq!(descriptor.variant(), Variant::TwoY);
/// assert_eq!(descriptor.work_factor(), 5);
/// assert_eq!(descriptor.salt(), "CCCCCCCCCCCCCCCCCCCCC.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashDescriptor {
    variant: Variant,
    work_factor: u32,
    salt: String,
    digest: String,
}

impl HashDescriptor {
    /// 变体标识
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// work factor
    pub fn work_factor(&self) -> u32 {
        self.work_factor
    }

    /// 22 位 salt
    pub fn salt(&self) -> &str {
        &self.salt
    }

    /// 31 位摘要
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl FromStr for HashDescriptor {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.len() != HASH_LENGTH {
            return Err(invalid_format(format!(
                "expected {} characters, got {}",
                HASH_LENGTH,
                s.len()
            )));
        }
        let setting = Setting::parse(s)?;

        let digest = &s[PREFIX_LENGTH + SALT_LENGTH..];
        if !digest.bytes().all(is_salt_char) {
            return Err(invalid_format("digest contains characters outside [./0-9A-Za-z]"));
        }

        Ok(Self {
            variant: setting.variant,
            work_factor: setting.work_factor,
            salt: s[PREFIX_LENGTH..PREFIX_LENGTH + SALT_LENGTH].to_string(),
            digest: digest.to_string(),
        })
    }
}

impl fmt::Display for HashDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${}${:02}${}{}",
            self.variant, self.work_factor, self.salt, self.digest
        )
    }
}
