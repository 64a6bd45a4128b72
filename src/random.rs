//! 安全随机数与常量时间比较模块
//!
//! 提供密码学安全的随机字节生成（用于 salt）以及防时序攻击的比较函数。

use rand::{TryRngCore, rngs::OsRng};
use subtle::ConstantTimeEq;

use crate::error::{CryptoError, Error, Result};

/// 生成指定长度的随机字节数组
///
/// 使用操作系统提供的密码学安全随机数生成器 (CSPRNG)
///
/// # Example
///
/// ```rust
/// use hashkit::random::generate_random_bytes;
///
/// let bytes = generate_random_bytes(16).unwrap();
/// assert_eq!(bytes.len(), 16);
/// ```
pub fn generate_random_bytes(length: usize) -> Result<Vec<u8>> {
    let mut bytes = vec![0u8; length];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| Error::Crypto(CryptoError::RngFailed(format!("{:?}", e))))?;
    Ok(bytes)
}

/// 常量时间比较两个字节切片
///
/// 总是扫描较长一方的全部长度，比较耗时与首个不同字节的位置无关。
/// 长度不同的输入一定返回 false。
///
/// # Example
///
/// ```rust
/// use hashkit::random::constant_time_compare;
///
/// assert!(constant_time_compare(b"secret_token", b"secret_token"));
/// assert!(!constant_time_compare(b"secret_token", b"other_token!"));
/// assert!(!constant_time_compare(b"secret", b"secret_token"));
/// ```
pub fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    let len = a.len().max(b.len());
    let mut equal = (a.len() as u64).ct_eq(&(b.len() as u64));

    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        equal &= x.ct_eq(&y);
    }

    equal.into()
}

/// 常量时间比较两个字符串
pub fn constant_time_compare_str(a: &str, b: &str) -> bool {
    constant_time_compare(a.as_bytes(), b.as_bytes())
}

// ============================================================================
// 辅助函数
// ============================================================================

/// 将字节数组编码为十六进制字符串
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
