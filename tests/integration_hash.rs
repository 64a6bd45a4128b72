//! pepper 门面集成测试
//!
//! 测试任意结构化输入的规范化、pepper 的作用以及共享 hasher 的语义。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use hashkit::{Blowfish, Hash, HashOptions, Hasher};
use serde::Serialize;

const PEPPER: &str = "909b96914de6866224f70f52a13e9fa6";

#[derive(Serialize)]
struct Empty {}

#[derive(Serialize)]
struct Other {}

#[derive(Serialize)]
struct Unit;

#[derive(Serialize)]
struct Account {
    name: String,
    roles: Vec<String>,
    active: bool,
}

fn facade(work_factor: u32) -> Hash {
    Hash::new(Blowfish::with_work_factor(work_factor).unwrap(), PEPPER)
}

/// 测试固定 pepper、work factor 15 与显式 salt 的黄金向量
#[test]
fn test_golden_vector_with_pepper() {
    let hash = facade(15);
    let options = HashOptions::new().with_salt("abcdefghijklmnopqrstuv");

    let encoded = hash.hash("foo", &options).unwrap();
    assert_eq!(
        encoded,
        "$2y$15$abcdefghijklmnopqrstuun/smc.88El9OiTRaKEs0hA8nHvh6uYG"
    );

    assert!(hash.verify("foo", &encoded, &HashOptions::default()).unwrap());
    assert!(!hash.verify("bar", &encoded, &HashOptions::default()).unwrap());
}

/// 测试门面结果等价于 hasher.hash(serialize(input))
#[test]
fn test_facade_delegates_to_hasher() {
    let hash = facade(4);
    let options = HashOptions::new().with_salt("delegation");

    let serialized = hash.serialize(&["a", "b"]).unwrap();
    assert_eq!(serialized, format!("[\"a\",\"b\"]{}", PEPPER));
    assert_eq!(
        hash.hash(&["a", "b"], &options).unwrap(),
        hash.hasher().hash(&serialized, &options).unwrap()
    );
}

/// 测试追加元素会改变序列化结果和哈希
#[test]
fn test_appending_element_changes_hash() {
    let hash = facade(4);
    let options = HashOptions::new().with_salt("append");

    let short = (Empty {}, Empty {}, 12345);
    let long = (Empty {}, Empty {}, 12345, "foo");

    assert_ne!(hash.serialize(&short).unwrap(), hash.serialize(&long).unwrap());
    assert_ne!(
        hash.hash(&short, &options).unwrap(),
        hash.hash(&long, &options).unwrap()
    );

    let encoded = hash.hash(&short, &HashOptions::default()).unwrap();
    assert!(hash.verify(&short, &encoded, &HashOptions::default()).unwrap());
    assert!(!hash.verify(&long, &encoded, &HashOptions::default()).unwrap());
}

/// 测试记录字段顺序不影响结果
#[test]
fn test_record_serialization_is_order_independent() {
    let hash = facade(4);

    let mut a = HashMap::new();
    a.insert("zeta", 1);
    a.insert("alpha", 2);
    a.insert("mid", 3);

    let mut b = BTreeMap::new();
    b.insert("mid", 3);
    b.insert("alpha", 2);
    b.insert("zeta", 1);

    assert_eq!(hash.serialize(&a).unwrap(), hash.serialize(&b).unwrap());
    assert_eq!(
        hash.serialize(&a).unwrap(),
        format!("{{\"alpha\":2,\"mid\":3,\"zeta\":1}}{}", PEPPER)
    );
}

/// 测试嵌套结构的哈希与校验
#[test]
fn test_nested_structure() {
    let hash = facade(4);
    let account = Account {
        name: "alice".to_string(),
        roles: vec!["admin".to_string(), "editor".to_string()],
        active: true,
    };

    let encoded = hash.hash(&account, &HashOptions::default()).unwrap();
    assert!(hash.verify(&account, &encoded, &HashOptions::default()).unwrap());

    let demoted = Account {
        roles: vec!["editor".to_string()],
        ..account
    };
    assert!(!hash.verify(&demoted, &encoded, &HashOptions::default()).unwrap());
}

/// 测试无状态对象的序列化彼此一致
#[test]
fn test_opaque_objects_serialize_identically() {
    let hash = facade(4);
    assert_eq!(hash.serialize(&Empty {}).unwrap(), hash.serialize(&Empty {}).unwrap());
    assert_eq!(hash.serialize(&Empty {}).unwrap(), format!("@Empty{{}}{}", PEPPER));
    assert_eq!(hash.serialize(&Unit).unwrap(), hash.serialize(&Unit).unwrap());
}

/// 测试不同类型的无状态对象序列化结果不同
#[test]
fn test_opaque_objects_of_different_types_differ() {
    let hash = facade(4);
    let empty_map: BTreeMap<String, u8> = BTreeMap::new();

    let encoded = [
        hash.serialize(&Empty {}).unwrap(),
        hash.serialize(&Other {}).unwrap(),
        hash.serialize(&empty_map).unwrap(),
        hash.serialize(&Unit).unwrap(),
    ];
    for (i, a) in encoded.iter().enumerate() {
        for b in &encoded[i + 1..] {
            assert_ne!(a, b);
        }
    }

    let options = HashOptions::new().with_salt("opaque");
    assert_ne!(
        hash.hash(&Empty {}, &options).unwrap(),
        hash.hash(&Other {}, &options).unwrap()
    );
}

/// 测试 NaN、无穷大与 None 互不相同
#[test]
fn test_non_finite_and_missing_values_are_distinguished() {
    let hash = facade(4);

    let encoded = [
        hash.serialize(&f64::NAN).unwrap(),
        hash.serialize(&f64::INFINITY).unwrap(),
        hash.serialize(&f64::NEG_INFINITY).unwrap(),
        hash.serialize(&None::<u8>).unwrap(),
        hash.serialize(&()).unwrap(),
    ];
    for (i, a) in encoded.iter().enumerate() {
        for b in &encoded[i + 1..] {
            assert_ne!(a, b);
        }
    }

    // 同一取值仍然稳定
    assert_eq!(hash.serialize(&f64::NAN).unwrap(), hash.serialize(&f64::NAN).unwrap());

    let nan = hash.hash(&f64::NAN, &HashOptions::default()).unwrap();
    assert!(hash.verify(&f64::NAN, &nan, &HashOptions::default()).unwrap());
    assert!(!hash.verify(&f64::INFINITY, &nan, &HashOptions::default()).unwrap());
    assert!(!hash.verify(&None::<u8>, &nan, &HashOptions::default()).unwrap());
}

/// 测试字符串与数字的区分
#[test]
fn test_scalar_types_are_distinguished() {
    let hash = facade(4);
    let options = HashOptions::new().with_salt("scalars");

    assert_ne!(
        hash.hash("12345", &options).unwrap(),
        hash.hash(&12345, &options).unwrap()
    );
    assert_ne!(
        hash.hash(&true, &options).unwrap(),
        hash.hash("true", &options).unwrap()
    );
}

/// 测试通过 hasher() 修改 work factor 对门面可见
#[test]
fn test_hasher_mutation_visible_through_facade() {
    let hash = facade(4);
    assert!(hash.hash("foo", &HashOptions::default()).unwrap().starts_with("$2y$04$"));

    hash.hasher().set_work_factor(6).unwrap();
    assert!(hash.hash("foo", &HashOptions::default()).unwrap().starts_with("$2y$06$"));

    assert!(hash.hasher().set_work_factor(40).is_err());
    assert_eq!(hash.hasher().work_factor(), 6);
}

/// 测试多个门面共享同一个 hasher
#[test]
fn test_facades_share_hasher() {
    let hasher = Arc::new(Blowfish::with_work_factor(4).unwrap());
    let first = Hash::from_shared(Arc::clone(&hasher), PEPPER);
    let second = Hash::from_shared(Arc::clone(&hasher), PEPPER);

    hasher.set_work_factor(5).unwrap();
    let encoded = first.hash("shared", &HashOptions::default()).unwrap();
    assert!(encoded.starts_with("$2y$05$"));
    assert!(second.verify("shared", &encoded, &HashOptions::default()).unwrap());
}

/// 测试常量时间比较
#[test]
fn test_compare() {
    assert!(Hash::compare(PEPPER, PEPPER));
    assert!(!Hash::compare(PEPPER, &PEPPER[1..]));
    assert!(!Hash::compare("a", "b"));
    assert!(hashkit::constant_time_compare_str("x", "x"));
}

/// 测试跨线程使用共享门面
#[test]
fn test_facade_is_thread_safe() {
    let hash = Arc::new(facade(4));
    let encoded = hash.hash("threads", &HashOptions::default()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let hash = Arc::clone(&hash);
            let encoded = encoded.clone();
            std::thread::spawn(move || {
                hash.verify("threads", &encoded, &HashOptions::default())
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
