//! 规范化序列化
//!
//! 把任意可序列化的输入转换为确定性的字节串：记录的字段按键排序，
//! 序列保持原有顺序，没有多余的空白。
//!
//! 编码在 JSON 的基础上扩展了几个 JSON 无法区分的取值：
//!
//! | 输入 | 编码 |
//! |---|---|
//! | `None` | `null` |
//! | `()` | `()` |
//! | `f64::NAN` / `f64::INFINITY` / `f64::NEG_INFINITY` | `NaN` / `Infinity` / `-Infinity` |
//! | `struct Empty {}` | `@Empty{}` |
//! | `struct Marker;` | `@Marker` |
//! | `Point(1, 2)` | `@Point[1,2]` |
//! | `Kind::A` / `Kind::B(1)` | `@Kind::A` / `@Kind::B(1)` |
//!
//! 结构体、元组结构体与枚举都带 `@` 前缀和类型名，
//! 因此字段相同但类型不同的值编码不同，同一类型的无字段实例编码一致。
//! newtype 结构体（`struct Id(u64)`）是透明的，按内部值编码。

use serde::Serialize;
use serde::ser::{self, Impossible, Serializer as _};

use crate::error::{Error, Result};

/// 类型标签前缀
const TYPE_SENTINEL: char = '@';

/// 将可序列化的值编码为规范化字符串
///
/// ```rust
/// use hashkit::canonical::to_canonical_string;
/// use std::collections::HashMap;
///
/// let map: HashMap<&str, i32> = [("b", 2), ("a", 1)].into_iter().collect();
/// assert_eq!(to_canonical_string(&map).unwrap(), r#"{"a":1,"b":2}"#);
///
/// #[derive(serde::Serialize)]
/// struct Empty {}
/// assert_eq!(to_canonical_string(&Empty {}).unwrap(), "@Empty{}");
/// ```
pub fn to_canonical_string<T: Serialize + ?Sized>(input: &T) -> Result<String> {
    input.serialize(CanonicalSerializer)
}

fn encode_str(s: &str) -> Result<String> {
    Ok(serde_json::to_string(s)?)
}

fn type_tag(name: &str) -> String {
    format!("{}{}", TYPE_SENTINEL, name)
}

fn variant_tag(name: &str, variant: &str) -> String {
    format!("{}{}::{}", TYPE_SENTINEL, name, variant)
}

/// 每个值都编码为独立的字符串，复合类型再按规则拼接
struct CanonicalSerializer;

impl ser::Serializer for CanonicalSerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = SeqEncoder;
    type SerializeTuple = SeqEncoder;
    type SerializeTupleStruct = SeqEncoder;
    type SerializeTupleVariant = SeqEncoder;
    type SerializeMap = RecordEncoder;
    type SerializeStruct = RecordEncoder;
    type SerializeStructVariant = RecordEncoder;

    fn serialize_bool(self, v: bool) -> Result<String> {
        Ok(if v { "true" } else { "false" }.to_string())
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_i128(self, v: i128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_u128(self, v: u128) -> Result<String> {
        Ok(v.to_string())
    }

    fn serialize_f32(self, v: f32) -> Result<String> {
        if v.is_finite() {
            Ok(serde_json::to_string(&v)?)
        } else {
            self.serialize_f64(f64::from(v))
        }
    }

    fn serialize_f64(self, v: f64) -> Result<String> {
        let token = if v.is_nan() {
            "NaN".to_string()
        } else if v == f64::INFINITY {
            "Infinity".to_string()
        } else if v == f64::NEG_INFINITY {
            "-Infinity".to_string()
        } else {
            serde_json::to_string(&v)?
        };
        Ok(token)
    }

    fn serialize_char(self, v: char) -> Result<String> {
        encode_str(v.encode_utf8(&mut [0u8; 4]))
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        encode_str(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<String> {
        let items: Vec<String> = v.iter().map(u8::to_string).collect();
        Ok(format!("[{}]", items.join(",")))
    }

    fn serialize_none(self) -> Result<String> {
        Ok("null".to_string())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String> {
        Ok("()".to_string())
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<String> {
        Ok(type_tag(name))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        Ok(variant_tag(name, variant))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<String> {
        Ok(format!(
            "{}({})",
            variant_tag(name, variant),
            value.serialize(CanonicalSerializer)?
        ))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqEncoder> {
        Ok(SeqEncoder::new(String::new(), len))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqEncoder> {
        Ok(SeqEncoder::new(String::new(), Some(len)))
    }

    fn serialize_tuple_struct(self, name: &'static str, len: usize) -> Result<SeqEncoder> {
        Ok(SeqEncoder::new(type_tag(name), Some(len)))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqEncoder> {
        Ok(SeqEncoder::new(variant_tag(name, variant), Some(len)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<RecordEncoder> {
        Ok(RecordEncoder::new(String::new(), len))
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<RecordEncoder> {
        Ok(RecordEncoder::new(type_tag(name), Some(len)))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<RecordEncoder> {
        Ok(RecordEncoder::new(variant_tag(name, variant), Some(len)))
    }
}

// ============================================================================
// 序列
// ============================================================================

/// 有序序列：`<tag>[a,b,...]`
struct SeqEncoder {
    tag: String,
    items: Vec<String>,
}

impl SeqEncoder {
    fn new(tag: String, len: Option<usize>) -> Self {
        Self {
            tag,
            items: Vec::with_capacity(len.unwrap_or(0)),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.items.push(value.serialize(CanonicalSerializer)?);
        Ok(())
    }

    fn finish(self) -> String {
        format!("{}[{}]", self.tag, self.items.join(","))
    }
}

impl ser::SerializeSeq for SeqEncoder {
    type Ok = String;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<String> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqEncoder {
    type Ok = String;
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<String> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqEncoder {
    type Ok = String;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<String> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqEncoder {
    type Ok = String;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.push(value)
    }

    fn end(self) -> Result<String> {
        Ok(self.finish())
    }
}

// ============================================================================
// 记录
// ============================================================================

/// 记录：`<tag>{k:v,...}`，条目按编码后的键排序
struct RecordEncoder {
    tag: String,
    entries: Vec<(String, String)>,
    pending_key: Option<String>,
}

impl RecordEncoder {
    fn new(tag: String, len: Option<usize>) -> Self {
        Self {
            tag,
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        }
    }

    fn push_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        let value = value.serialize(CanonicalSerializer)?;
        self.entries.push((encode_str(key)?, value));
        Ok(())
    }

    fn finish(mut self) -> String {
        self.entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        let body: Vec<String> = self
            .entries
            .into_iter()
            .map(|(key, value)| format!("{}:{}", key, value))
            .collect();
        format!("{}{{{}}}", self.tag, body.join(","))
    }
}

impl ser::SerializeMap for RecordEncoder {
    type Ok = String;
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.pending_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::Serialization("map value without a key".to_string()))?;
        self.entries.push((key, value.serialize(CanonicalSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<String> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for RecordEncoder {
    type Ok = String;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.push_field(key, value)
    }

    fn end(self) -> Result<String> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for RecordEncoder {
    type Ok = String;
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<()> {
        self.push_field(key, value)
    }

    fn end(self) -> Result<String> {
        Ok(self.finish())
    }
}

// ============================================================================
// 映射键
// ============================================================================

/// 映射键只接受标量，按其规范编码参与排序
///
/// 字符串键带引号，整数键不带，因此 `{"1": ..}` 与 `{1: ..}` 编码不同。
struct MapKeySerializer;

fn key_must_be_scalar() -> Error {
    Error::Serialization("map key must be a string, char, bool or integer".to_string())
}

impl ser::Serializer for MapKeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    fn serialize_bool(self, v: bool) -> Result<String> {
        CanonicalSerializer.serialize_bool(v)
    }

    fn serialize_i8(self, v: i8) -> Result<String> {
        CanonicalSerializer.serialize_i8(v)
    }

    fn serialize_i16(self, v: i16) -> Result<String> {
        CanonicalSerializer.serialize_i16(v)
    }

    fn serialize_i32(self, v: i32) -> Result<String> {
        CanonicalSerializer.serialize_i32(v)
    }

    fn serialize_i64(self, v: i64) -> Result<String> {
        CanonicalSerializer.serialize_i64(v)
    }

    fn serialize_i128(self, v: i128) -> Result<String> {
        CanonicalSerializer.serialize_i128(v)
    }

    fn serialize_u8(self, v: u8) -> Result<String> {
        CanonicalSerializer.serialize_u8(v)
    }

    fn serialize_u16(self, v: u16) -> Result<String> {
        CanonicalSerializer.serialize_u16(v)
    }

    fn serialize_u32(self, v: u32) -> Result<String> {
        CanonicalSerializer.serialize_u32(v)
    }

    fn serialize_u64(self, v: u64) -> Result<String> {
        CanonicalSerializer.serialize_u64(v)
    }

    fn serialize_u128(self, v: u128) -> Result<String> {
        CanonicalSerializer.serialize_u128(v)
    }

    fn serialize_f32(self, _v: f32) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_f64(self, _v: f64) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_char(self, v: char) -> Result<String> {
        CanonicalSerializer.serialize_char(v)
    }

    fn serialize_str(self, v: &str) -> Result<String> {
        encode_str(v)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_none(self) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_unit(self) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> Result<String> {
        CanonicalSerializer.serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String> {
        Err(key_must_be_scalar())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct> {
        Err(key_must_be_scalar())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant> {
        Err(key_must_be_scalar())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(key_must_be_scalar())
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(key_must_be_scalar())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant> {
        Err(key_must_be_scalar())
    }
}
