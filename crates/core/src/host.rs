//! Host type normalization
//!
//! Turns any `serde::Serialize` type into a `Value`, so native collections
//! and user structs can be handed straight to the encoders.
//!
//! # Mapping
//!
//! | Host shape                          | Value                      |
//! |-------------------------------------|----------------------------|
//! | `()`, `None`, unit structs          | `Null`                     |
//! | `bool`                              | `Bool`                     |
//! | integers that fit `i64`             | `Int`                      |
//! | `f32`, `f64`                        | `Float`                    |
//! | `&str`, `String`, `char`            | `String`                   |
//! | `&[u8]` via `serialize_bytes`       | `List` of `Int`            |
//! | sequences, tuples, tuple structs    | `List`                     |
//! | maps, structs                       | `Dict` (field order kept)  |
//! | unit enum variants                  | `String` (variant name)    |
//! | newtype/tuple/struct variants       | `Dict` `{variant: payload}`|
//!
//! `u64`, `i128` and `u128` values outside the `i64` range have no
//! representation and fail with `EncodeError::Unsupported`.

use crate::error::EncodeError;
use crate::value::{Dict, Value};
use serde::ser::{self, Serialize};

/// Normalize a host value
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, EncodeError> {
    value.serialize(ValueSerializer)
}

/// Serializer whose output is a `Value`
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer;

fn out_of_range(kind: &str, v: impl std::fmt::Display) -> EncodeError {
    EncodeError::Unsupported(format!("{} {} does not fit in a 64-bit signed integer", kind, v))
}

fn single_entry(variant: &'static str, payload: Value) -> Value {
    let mut dict = Dict::with_capacity(1);
    dict.insert(Value::from(variant), payload);
    Value::Dict(dict)
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = EncodeError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantMapBuilder;

    fn serialize_bool(self, v: bool) -> Result<Value, EncodeError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, EncodeError> {
        Ok(Value::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, EncodeError> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| out_of_range("i128", v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, EncodeError> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| out_of_range("u64", v))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, EncodeError> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| out_of_range("u128", v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, EncodeError> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value, EncodeError> {
        Ok(Value::from(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, EncodeError> {
        Ok(v.iter().map(|&b| Value::from(b)).collect())
    }

    fn serialize_none(self) -> Result<Value, EncodeError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, EncodeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, EncodeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, EncodeError> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, EncodeError> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, EncodeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, EncodeError> {
        Ok(single_entry(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, EncodeError> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, EncodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, EncodeError> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantSeqBuilder, EncodeError> {
        Ok(VariantSeqBuilder {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, EncodeError> {
        Ok(MapBuilder {
            dict: Dict::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapBuilder, EncodeError> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<VariantMapBuilder, EncodeError> {
        Ok(VariantMapBuilder {
            variant,
            dict: Dict::with_capacity(len),
        })
    }
}

/// Collects sequence and tuple elements into a `List`
pub struct SeqBuilder {
    items: Vec<Value>,
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(Value::List(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, EncodeError> {
        ser::SerializeSeq::end(self)
    }
}

/// Collects a tuple variant's fields into `{variant: [fields]}`
pub struct VariantSeqBuilder {
    variant: &'static str,
    items: Vec<Value>,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(single_entry(self.variant, Value::List(self.items)))
    }
}

/// Collects map entries and struct fields into a `Dict`
pub struct MapBuilder {
    dict: Dict,
    pending_key: Option<Value>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), EncodeError> {
        self.pending_key = Some(to_value(key)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), EncodeError> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| EncodeError::Unsupported("map value without a key".to_string()))?;
        self.dict.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(Value::Dict(self.dict))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        self.dict.insert(Value::from(key), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(Value::Dict(self.dict))
    }
}

/// Collects a struct variant's fields into `{variant: {fields}}`
pub struct VariantMapBuilder {
    variant: &'static str,
    dict: Dict,
}

impl ser::SerializeStructVariant for VariantMapBuilder {
    type Ok = Value;
    type Error = EncodeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), EncodeError> {
        self.dict.insert(Value::from(key), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value, EncodeError> {
        Ok(single_entry(self.variant, Value::Dict(self.dict)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Serialize)]
    struct Point {
        x: i32,
        y: i32,
        label: Option<String>,
    }

    #[derive(Serialize)]
    enum Shape {
        Empty,
        Circle(f64),
        Segment(i32, i32),
        Rect { w: u8, h: u8 },
    }

    #[test]
    fn test_primitives() {
        assert_eq!(to_value(&()).unwrap(), Value::Null);
        assert_eq!(to_value(&true).unwrap(), Value::Bool(true));
        assert_eq!(to_value(&42u16).unwrap(), Value::Int(42));
        assert_eq!(to_value(&2.5f32).unwrap(), Value::Float(2.5));
        assert_eq!(to_value(&'x').unwrap(), Value::from("x"));
        assert_eq!(to_value("text").unwrap(), Value::from("text"));
        assert_eq!(to_value(&None::<u8>).unwrap(), Value::Null);
    }

    #[test]
    fn test_sequences_and_tuples() {
        assert_eq!(to_value(&vec![1, 2, 3]).unwrap(), Value::from(vec![1, 2, 3]));
        assert_eq!(to_value(&[true, false]).unwrap(), Value::from([true, false]));
        assert_eq!(
            to_value(&(1, "two")).unwrap(),
            Value::List(vec![Value::Int(1), Value::from("two")])
        );
    }

    #[test]
    fn test_struct_keeps_field_order() {
        let v = to_value(&Point {
            x: 1,
            y: 2,
            label: None,
        })
        .unwrap();
        let keys: Vec<&str> = v
            .as_dict()
            .unwrap()
            .keys()
            .filter_map(Value::as_str)
            .collect();
        assert_eq!(keys, vec!["x", "y", "label"]);
        assert_eq!(v.get("label"), Some(&Value::Null));
    }

    #[test]
    fn test_maps() {
        let mut hm = HashMap::new();
        hm.insert("a".to_string(), vec![1]);
        assert_eq!(to_value(&hm).unwrap().get("a"), Some(&Value::from(vec![1])));

        let mut bm = BTreeMap::new();
        bm.insert(7, "seven");
        let v = to_value(&bm).unwrap();
        assert_eq!(
            v.as_dict().unwrap().get(&Value::Int(7)),
            Some(&Value::from("seven"))
        );
    }

    #[test]
    fn test_enum_variants() {
        assert_eq!(to_value(&Shape::Empty).unwrap(), Value::from("Empty"));
        assert_eq!(
            to_value(&Shape::Circle(1.0)).unwrap().get("Circle"),
            Some(&Value::Float(1.0))
        );
        assert_eq!(
            to_value(&Shape::Segment(1, 2)).unwrap().get("Segment"),
            Some(&Value::from(vec![1, 2]))
        );
        let rect = to_value(&Shape::Rect { w: 3, h: 4 }).unwrap();
        assert_eq!(rect.get("Rect").and_then(|r| r.get("h")), Some(&Value::Int(4)));
    }

    #[test]
    fn test_bytes_become_int_list() {
        struct Raw<'a>(&'a [u8]);
        impl Serialize for Raw<'_> {
            fn serialize<S: ser::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.serialize_bytes(self.0)
            }
        }
        assert_eq!(to_value(&Raw(&[0, 255])).unwrap(), Value::from(vec![0, 255]));
    }

    #[test]
    fn test_out_of_range_integers_are_unsupported() {
        let err = to_value(&u64::MAX).unwrap_err();
        assert!(
            matches!(err, EncodeError::Unsupported(ref msg) if msg.contains("18446744073709551615"))
        );
        assert!(to_value(&(i64::MAX as u64)).is_ok());
        assert!(to_value(&i128::MIN).is_err());
        assert_eq!(to_value(&5u128).unwrap(), Value::Int(5));
    }

    #[test]
    fn test_value_round_trips_through_itself() {
        let original: Value = vec![("k", Value::from(vec![1.5, 2.5])), ("n", Value::Null)]
            .into_iter()
            .collect();
        assert_eq!(to_value(&original).unwrap(), original);
    }
}
