//! bcrypt (Blowfish) 哈希器实现

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};

use super::crypt::{self, HashDescriptor, Variant};
use super::salt::Salt;
use super::{HashOptions, Hasher};
use crate::config::{HasherConfig, validate_work_factor};
use crate::error::{Error, PasswordHashError, Result};
use crate::random::constant_time_compare_str;

/// 原语自检使用的已知向量
const SELF_TEST_SECRET: &[u8] = b"U*U";
const SELF_TEST_SETTING: &str = "$2y$05$CCCCCCCCCCCCCCCCCCCCC.";
const SELF_TEST_EXPECTED: &str = "$2y$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";

/// bcrypt 哈希器
///
/// work factor 保存在原子变量中，可以通过共享引用修改，
/// 修改只影响之后的 [`hash`](Hasher::hash) 调用。
///
/// ```rust
/// use hashkit::hasher::Blowfish;
///
/// let hasher = Blowfish::with_work_factor(4).unwrap();
/// hasher.set_work_factor(5).unwrap();
/// assert_eq!(hasher.work_factor(), 5);
///
/// assert!(hasher.set_work_factor(32).is_err());
/// assert_eq!(hasher.work_factor(), 5);
/// ```
#[derive(Debug)]
pub struct Blowfish {
    work_factor: AtomicU32,
}

impl Blowfish {
    /// 使用默认 work factor 创建哈希器
    ///
    /// # Errors
    ///
    /// 如果当前平台上 bcrypt 原语自检失败，返回
    /// [`PasswordHashError::Unavailable`]
    pub fn new() -> Result<Self> {
        Self::from_config(&HasherConfig::default())
    }

    /// 使用指定 work factor 创建哈希器
    ///
    /// # Errors
    ///
    /// - work factor 不在 4-31 范围内
    /// - 原语不可用
    pub fn with_work_factor(work_factor: u32) -> Result<Self> {
        Self::from_config(&HasherConfig::new().with_work_factor(work_factor))
    }

    /// 根据配置创建哈希器
    pub fn from_config(config: &HasherConfig) -> Result<Self> {
        ensure_available()?;
        config.validate()?;

        Ok(Self {
            work_factor: AtomicU32::new(config.work_factor),
        })
    }

    /// 设置 work factor
    ///
    /// 超出 4-31 范围时返回错误，原有配置保持不变。
    pub fn set_work_factor(&self, work_factor: u32) -> Result<&Self> {
        validate_work_factor(work_factor)?;
        let previous = self.work_factor.swap(work_factor, Ordering::Relaxed);
        tracing::debug!(previous, work_factor, "bcrypt work factor updated");
        Ok(self)
    }

    /// 当前 work factor
    pub fn work_factor(&self) -> u32 {
        self.work_factor.load(Ordering::Relaxed)
    }

    /// 当前配置的快照
    pub fn config(&self) -> HasherConfig {
        HasherConfig::new().with_work_factor(self.work_factor())
    }

    /// 检查哈希是否需要重新生成
    ///
    /// 无法解析、变体不是 `$2y$`、或 work factor 与当前配置不同的哈希都需要重新生成。
    ///
    /// ```rust
    /// use hashkit::hasher::{Blowfish, HashOptions, Hasher};
    ///
    /// let hasher = Blowfish::with_work_factor(4).unwrap();
    /// let hash = hasher.hash("secret", &HashOptions::default()).unwrap();
    /// assert!(!hasher.needs_rehash(&hash));
    ///
    /// hasher.set_work_factor(5).unwrap();
    /// assert!(hasher.needs_rehash(&hash));
    /// ```
    pub fn needs_rehash(&self, encoded: &str) -> bool {
        match encoded.parse::<HashDescriptor>() {
            Ok(descriptor) => {
                descriptor.variant() != Variant::TwoY
                    || descriptor.work_factor() != self.work_factor()
            }
            Err(_) => true,
        }
    }
}

impl Hasher for Blowfish {
    fn hash(&self, input: &str, options: &HashOptions) -> Result<String> {
        let work_factor = self.work_factor();
        validate_work_factor(work_factor)?;

        let setting = match options.salt.as_deref() {
            Some(raw) => {
                let salt = Salt::derive(raw);
                if salt.as_str() != raw {
                    tracing::debug!("supplied salt is not a valid bcrypt salt; using its digest");
                }
                crypt::format_setting(work_factor, salt.as_str())
            }
            None => crypt::gen_setting(work_factor)?,
        };

        crypt::crypt(input.as_bytes(), &setting)
    }

    fn verify(&self, input: &str, encoded: &str, _options: &HashOptions) -> Result<bool> {
        let rehashed = match crypt::crypt(input.as_bytes(), encoded) {
            Ok(hash) => hash,
            Err(Error::PasswordHash(
                PasswordHashError::InvalidFormat(reason)
                | PasswordHashError::UnsupportedAlgorithm(reason),
            )) => {
                tracing::debug!(%reason, "stored hash cannot be parsed; treating as mismatch");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        Ok(constant_time_compare_str(&rehashed, encoded))
    }
}

/// 运行一次已知向量自检，结果在进程内缓存
fn ensure_available() -> Result<()> {
    static SELF_TEST: OnceLock<std::result::Result<(), String>> = OnceLock::new();

    let outcome = SELF_TEST.get_or_init(|| match crypt::crypt(SELF_TEST_SECRET, SELF_TEST_SETTING) {
        Ok(hash) if constant_time_compare_str(&hash, SELF_TEST_EXPECTED) => Ok(()),
        Ok(_) => Err("self-test produced an unexpected hash".to_string()),
        Err(e) => Err(e.to_string()),
    });

    outcome.clone().map_err(|reason| {
        tracing::error!(%reason, "bcrypt primitive is unavailable");
        PasswordHashError::Unavailable(reason).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher(work_factor: u32) -> Blowfish {
        Blowfish::with_work_factor(work_factor).unwrap()
    }

    #[test]
    fn test_default_work_factor() {
        assert_eq!(Blowfish::new().unwrap().work_factor(), 12);
    }

    #[test]
    fn test_constructor_rejects_invalid_work_factor() {
        assert!(Blowfish::with_work_factor(3).unwrap_err().is_invalid_argument());
        assert!(Blowfish::with_work_factor(32).unwrap_err().is_invalid_argument());
        assert!(Blowfish::with_work_factor(4).is_ok());
        assert!(Blowfish::with_work_factor(31).is_ok());
    }

    #[test]
    fn test_set_work_factor_keeps_previous_on_error() {
        let hasher = hasher(6);
        for invalid in [0, 3, 32, u32::MAX] {
            assert!(hasher.set_work_factor(invalid).is_err());
            assert_eq!(hasher.work_factor(), 6);
        }
    }

    #[test]
    fn test_set_work_factor_chains() {
        let hasher = hasher(4);
        let work_factor = hasher
            .set_work_factor(7)
            .unwrap()
            .set_work_factor(5)
            .unwrap()
            .work_factor();
        assert_eq!(work_factor, 5);
        assert_eq!(hasher.config().work_factor, 5);
    }

    #[test]
    fn test_hash_encodes_work_factor() {
        let hasher = hasher(4);
        for work_factor in 4..=6 {
            hasher.set_work_factor(work_factor).unwrap();
            let hash = hasher.hash("secret", &HashOptions::default()).unwrap();
            assert_eq!(&hash[4..6], format!("{:02}", work_factor));
            assert_eq!(hash.len(), crypt::HASH_LENGTH);
        }
    }

    #[test]
    fn test_golden_valid_salt() {
        let hasher = hasher(5);
        let options = HashOptions::new().with_salt("./A1aaaaaaaaaaaaaaaaaa");
        assert_eq!(
            hasher.hash("foo", &options).unwrap(),
            "$2y$05$./A1aaaaaaaaaaaaaaaaaOZW9OJaO6Alj4.ZDbOi6Jrbn.bGZfYRK"
        );
    }

    #[test]
    fn test_golden_normalized_salt() {
        let hasher = hasher(5);
        let options = HashOptions::new().with_salt("salt");
        assert_eq!(
            hasher.hash("foo", &options).unwrap(),
            "$2y$05$ceb20772e0c9d240c75ebugm2AOmnuR5.LsdpDZGAjkE1DupDTPFW"
        );
    }

    #[test]
    fn test_random_salt_differs() {
        let hasher = hasher(4);
        let hash1 = hasher.hash("same", &HashOptions::default()).unwrap();
        let hash2 = hasher.hash("same", &HashOptions::default()).unwrap();
        assert_ne!(hash1, hash2);
        assert!(hasher.verify("same", &hash1, &HashOptions::default()).unwrap());
        assert!(hasher.verify("same", &hash2, &HashOptions::default()).unwrap());
    }

    #[test]
    fn test_verify_uses_stored_work_factor() {
        let hasher = hasher(5);
        let hash = hasher.hash("secret", &HashOptions::default()).unwrap();

        hasher.set_work_factor(4).unwrap();
        assert!(hasher.verify("secret", &hash, &HashOptions::default()).unwrap());
    }

    #[test]
    fn test_verify_malformed_hash_is_mismatch() {
        let hasher = hasher(4);
        for encoded in ["", "*0", "not a hash", "$2x$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW"] {
            assert!(!hasher.verify("U*U", encoded, &HashOptions::default()).unwrap());
        }
    }

    #[test]
    fn test_verify_truncated_hash_is_mismatch() {
        let hasher = hasher(4);
        let hash = hasher.hash("secret", &HashOptions::default()).unwrap();
        assert!(!hasher.verify("secret", &hash[..50], &HashOptions::default()).unwrap());
    }

    #[test]
    fn test_verify_other_variants() {
        let hasher = hasher(4);
        let hash = "$2a$06$DCq7YPn5Rq63x1Lad4cll.TV4S6ytwfsfvkgY8jIucDrjc8deX1s.";
        assert!(hasher.verify("", hash, &HashOptions::default()).unwrap());
        assert!(hasher.needs_rehash(hash));
    }

    #[test]
    fn test_needs_rehash() {
        let hasher = hasher(4);
        let hash = hasher.hash("secret", &HashOptions::default()).unwrap();
        assert!(!hasher.needs_rehash(&hash));
        assert!(hasher.needs_rehash("garbage"));

        hasher.set_work_factor(5).unwrap();
        assert!(hasher.needs_rehash(&hash));
    }

    #[test]
    fn test_self_test_passes() {
        assert!(ensure_available().is_ok());
    }
}
