//! # hashkit
//!
//! 基于 bcrypt 的带 pepper 哈希库。
//!
//! ## 功能特性
//!
//! - **统一的哈希器契约**: [`Hasher`] trait，[`Blowfish`] 为其 bcrypt 实现
//! - **work factor 管理**: 运行时可调，范围 4-31，越界直接拒绝
//! - **salt 规范化**: 任意字符串都会被确定性地转换为合法的 22 位 salt
//! - **pepper 门面**: [`Hash`] 将任意可序列化的输入规范化并追加应用级 pepper
//! - **常量时间比较**: 校验时重新哈希并做防时序攻击的比较
//!
//! ## 示例
//!
//! ```rust
//! use hashkit::{Blowfish, Hash, HashOptions};
//!
//! let hash = Hash::new(Blowfish::with_work_factor(4).unwrap(), "909b96914de6866224f70f52a13e9fa6");
//!
//! let encoded = hash.hash("foo", &HashOptions::default()).unwrap();
//! assert_eq!(encoded.len(), 60);
//!
//! assert!(hash.verify("foo", &encoded, &HashOptions::default()).unwrap());
//! assert!(!hash.verify("bar", &encoded, &HashOptions::default()).unwrap());
//! ```
//!
//! ## 直接使用 hasher
//!
//! ```rust
//! use hashkit::{Blowfish, HashOptions, Hasher};
//!
//! let hasher = Blowfish::with_work_factor(5).unwrap();
//! let options = HashOptions::new().with_salt("./A1aaaaaaaaaaaaaaaaaa");
//!
//! let encoded = hasher.hash("foo", &options).unwrap();
//! assert_eq!(encoded, "$2y$05$./A1aaaaaaaaaaaaaaaaaOZW9OJaO6Alj4.ZDbOi6Jrbn.bGZfYRK");
//! ```

pub mod canonical;
pub mod config;
pub mod error;
pub mod hash;
pub mod hasher;
pub mod random;

pub use error::{Error, Result};

// ============================================================================
// 哈希相关导出
// ============================================================================

pub use config::HasherConfig;
pub use hash::Hash;
pub use hasher::{Blowfish, HashDescriptor, HashOptions, Hasher, Salt, derive_salt};

// ============================================================================
// 常量时间比较导出
// ============================================================================

pub use random::{constant_time_compare, constant_time_compare_str};
