use std::{
    fmt,
    ops::{Index, IndexMut},
    str::FromStr,
};

use smol_str::SmolStr;

use crate::types::{Array, Object};
use crate::{Error, Result};

static NULL: Value = Value::Null;

/// One JSON datum. Cloning is a deep copy; containers own their children.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(f32),
    String(String),
    Array(Array),
    Object(Object),
}

impl Value {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub const fn is_boolean(&self) -> bool {
        matches!(self, Value::Boolean(_))
    }

    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub const fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Array> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn to_boolean(&self) -> Result<bool> {
        self.as_boolean()
            .ok_or_else(|| Error::type_mismatch("boolean", self.type_name()))
    }

    pub fn to_number(&self) -> Result<f32> {
        self.as_number()
            .ok_or_else(|| Error::type_mismatch("number", self.type_name()))
    }

    /// Typed string accessor. Named `to_str` so it does not shadow
    /// `ToString::to_string`, which renders the whole value.
    pub fn to_str(&self) -> Result<&str> {
        self.as_str()
            .ok_or_else(|| Error::type_mismatch("string", self.type_name()))
    }

    pub fn to_string_mut(&mut self) -> Result<&mut String> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(Error::type_mismatch("string", other.type_name())),
        }
    }

    pub fn to_array(&self) -> Result<&Array> {
        self.as_array()
            .ok_or_else(|| Error::type_mismatch("array", self.type_name()))
    }

    pub fn to_array_mut(&mut self) -> Result<&mut Array> {
        match self {
            Value::Array(arr) => Ok(arr),
            other => Err(Error::type_mismatch("array", other.type_name())),
        }
    }

    pub fn to_object(&self) -> Result<&Object> {
        self.as_object()
            .ok_or_else(|| Error::type_mismatch("object", self.type_name()))
    }

    pub fn to_object_mut(&mut self) -> Result<&mut Object> {
        match self {
            Value::Object(obj) => Ok(obj),
            other => Err(Error::type_mismatch("object", other.type_name())),
        }
    }

    /// Positional access. Objects are indexed by insertion order.
    pub fn at(&self, index: usize) -> Result<&Value> {
        match self {
            Value::Array(arr) => arr
                .get(index)
                .ok_or_else(|| Error::index_out_of_range(index, arr.len(), "array")),
            Value::Object(obj) => obj
                .value_at(index)
                .ok_or_else(|| Error::index_out_of_range(index, obj.len(), "object")),
            other => Err(Error::type_mismatch("array or object", other.type_name())),
        }
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut Value> {
        match self {
            Value::Array(arr) => {
                let len = arr.len();
                arr.get_mut(index)
                    .ok_or_else(|| Error::index_out_of_range(index, len, "array"))
            }
            Value::Object(obj) => {
                let len = obj.len();
                obj.value_at_mut(index)
                    .ok_or_else(|| Error::index_out_of_range(index, len, "object"))
            }
            other => Err(Error::type_mismatch("array or object", other.type_name())),
        }
    }

    pub fn key_at(&self, index: usize) -> Result<&str> {
        let obj = self.to_object()?;
        obj.key_at(index)
            .ok_or_else(|| Error::index_out_of_range(index, obj.len(), "object"))
    }

    /// Read-only keyed lookup; never inserts.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(obj) => obj.get(key),
            _ => None,
        }
    }

    /// Keyed mutable access with upsert. A `Null` is promoted to an empty
    /// object first, so chains like `v.entry("a")?.entry("b")?` build nested
    /// objects on demand.
    pub fn entry(&mut self, key: &str) -> Result<&mut Value> {
        if self.is_null() {
            *self = Value::Object(Object::new());
        }
        match self {
            Value::Object(obj) => Ok(obj.entry(key)),
            other => Err(Error::type_mismatch("object", other.type_name())),
        }
    }

    /// Replace the active variant.
    pub fn set(&mut self, value: impl Into<Value>) {
        *self = value.into();
    }

    pub fn take(&mut self) -> Value {
        std::mem::take(self)
    }

    /// Number of children for containers, `0` otherwise.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(arr) => arr.len(),
            Value::Object(obj) => obj.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::encode::to_string(self, &Default::default()))
    }
}

impl FromStr for Value {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        crate::parse(s)
    }
}

impl Index<usize> for Value {
    type Output = Value;

    fn index(&self, index: usize) -> &Self::Output {
        match self.at(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl IndexMut<usize> for Value {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match self.at_mut(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl Index<&str> for Value {
    type Output = Value;

    /// Missing keys and `Null` receivers read as `Null`.
    fn index(&self, key: &str) -> &Self::Output {
        match self {
            Value::Object(obj) => obj.get(key).unwrap_or(&NULL),
            Value::Null => &NULL,
            other => panic!(
                "cannot index into non-object value of type {}",
                other.type_name()
            ),
        }
    }
}

impl IndexMut<&str> for Value {
    fn index_mut(&mut self, key: &str) -> &mut Self::Output {
        match self.entry(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl Index<&String> for Value {
    type Output = Value;

    fn index(&self, key: &String) -> &Self::Output {
        self.index(key.as_str())
    }
}

impl IndexMut<&String> for Value {
    fn index_mut(&mut self, key: &String) -> &mut Self::Output {
        self.index_mut(key.as_str())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(n)
    }
}

macro_rules! from_narrowed_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n as f32)
                }
            }
        )*
    };
}

from_narrowed_number!(f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::String(s.clone())
    }
}

impl From<SmolStr> for Value {
    fn from(s: SmolStr) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Array> for Value {
    fn from(arr: Array) -> Self {
        Value::Array(arr)
    }
}

impl From<Object> for Value {
    fn from(obj: Object) -> Self {
        Value::Object(obj)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl From<&Value> for Value {
    fn from(value: &Value) -> Self {
        value.clone()
    }
}

impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::from),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(b),
            Value::Number(n) => number_to_json(n),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(Into::into).collect()),
            Value::Object(obj) => {
                let mut map = serde_json::Map::with_capacity(obj.len());
                for (k, v) in obj {
                    map.insert(k, v.into());
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        value.clone().into()
    }
}

/// Integral values become JSON integers so `from_str::<u32>` and friends work
/// through the serde bridge.
fn number_to_json(n: f32) -> serde_json::Value {
    if n.fract() == 0.0 && n.abs() < crate::constants::F32_EXACT_INT {
        return serde_json::Value::Number((n as i64).into());
    }
    serde_json::Number::from_f64(f64::from(n))
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use std::panic::{catch_unwind, AssertUnwindSafe};

    use serde_json::json;

    use super::*;
    use crate::ErrorKind;

    #[rstest::rstest]
    fn nested_keyed_assignment_builds_objects() {
        let mut value = Value::new();
        value["x"]["y"] = 5.into();

        let expected: Object = [("x", Value::Object([("y", 5.0f32)].into_iter().collect()))]
            .into_iter()
            .collect();
        assert_eq!(value, Value::Object(expected));
    }

    #[rstest::rstest]
    fn entry_on_scalar_is_type_mismatch() {
        let mut value = Value::from(3.0f32);
        let err = value.entry("a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(value, Value::Number(3.0));
    }

    #[rstest::rstest]
    fn clone_is_deep() {
        let mut original = Value::new();
        original["list"] = vec![1, 2, 3].into();
        original["inner"]["flag"] = true.into();

        let mut copy = original.clone();
        copy["list"].to_array_mut().unwrap().push(4);
        copy["inner"]["flag"] = false.into();

        assert_eq!(original["list"].len(), 3);
        assert_eq!(original["inner"]["flag"], Value::Boolean(true));
        assert_eq!(copy["list"].len(), 4);
    }

    #[rstest::rstest]
    fn typed_accessors_check_variant() {
        let value = Value::from("text");
        assert_eq!(value.to_str().unwrap(), "text");
        assert_eq!(value.to_number().unwrap_err().kind(), ErrorKind::TypeMismatch);
        assert_eq!(value.to_boolean().unwrap_err().kind(), ErrorKind::TypeMismatch);
        assert!(value.to_object().is_err());
        assert!(value.to_array().is_err());

        assert_eq!(Value::from(2.5f32).to_number().unwrap(), 2.5);
        assert!(Value::from(true).to_boolean().unwrap());
    }

    #[rstest::rstest]
    fn positional_access_on_objects_follows_insertion_order() {
        let mut value = Value::new();
        value["b"] = 1.into();
        value["a"] = 2.into();

        assert_eq!(value[0], Value::Number(1.0));
        assert_eq!(value.key_at(1).unwrap(), "a");
        assert_eq!(
            value.at(2).unwrap_err().kind(),
            ErrorKind::IndexOutOfRange
        );
    }

    #[rstest::rstest]
    fn positional_access_rejects_scalars() {
        let value = Value::Boolean(true);
        assert_eq!(value.at(0).unwrap_err().kind(), ErrorKind::TypeMismatch);
        assert!(value.key_at(0).is_err());
    }

    #[rstest::rstest]
    fn assignment_replaces_variant() {
        let mut value = Value::from(vec!["a", "b"]);
        value.set("now a string");
        assert!(value.is_string());
        value.set(());
        assert!(value.is_null());
        value.set(Some(1.5f32));
        assert_eq!(value, Value::Number(1.5));
        value.set(None::<bool>);
        assert!(value.is_null());
    }

    #[rstest::rstest]
    fn shared_index_reads_missing_as_null() {
        let value = Value::Object(Object::new());
        assert!(value["missing"].is_null());
        assert!(Value::Null["missing"].is_null());
        assert!(value.get("missing").is_none());
        assert!(value.as_object().unwrap().is_empty());
    }

    #[rstest::rstest]
    fn indexing_panics_on_invalid_access() {
        let number = Value::Number(1.0);
        assert!(catch_unwind(AssertUnwindSafe(|| {
            let _ = &number["key"];
        }))
        .is_err());

        let mut number = Value::Number(1.0);
        assert!(catch_unwind(AssertUnwindSafe(|| {
            number["key"] = Value::Null;
        }))
        .is_err());

        let array = Value::Array(Array::new());
        assert!(catch_unwind(AssertUnwindSafe(|| {
            let _ = &array[0];
        }))
        .is_err());
    }

    #[rstest::rstest]
    fn take_leaves_null() {
        let mut value = Value::from("moved");
        let taken = value.take();
        assert!(value.is_null());
        assert_eq!(taken.as_str(), Some("moved"));
    }

    #[rstest::rstest]
    fn serde_json_conversions() {
        let source = json!({"b": [1, 2.5, "x"], "a": {"c": null, "d": false}});
        let value = Value::from(source.clone());
        assert_eq!(value.key_at(0).unwrap(), "b");

        let back: serde_json::Value = value.into();
        assert_eq!(back, source);
    }

    #[rstest::rstest]
    fn non_finite_numbers_convert_to_json_null() {
        let back: serde_json::Value = Value::Number(f32::NAN).into();
        assert_eq!(back, json!(null));
    }
}
