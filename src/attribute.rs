use std::{collections::BTreeMap, fmt::Display};

use crate::error::Error;

/// A single attribute value attached to a vertex, face or edge.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Float(f64),
    Int(i64),
    Str(String),
    Bool(bool),
}

impl AttrValue {
    /// Numeric view of the value. Integers are converted to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(v) => Some(*v),
            AttrValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<i32> for AttrValue {
    fn from(value: i32) -> Self {
        AttrValue::Int(value as i64)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttrValue::Float(v) => write!(f, "{v}"),
            AttrValue::Int(v) => write!(f, "{v}"),
            AttrValue::Str(v) => write!(f, "{v:?}"),
            AttrValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Named attributes of a mesh element.
///
/// Keys are kept in sorted order, so iteration is deterministic. When an
/// element is created, the attributes supplied by the caller are merged over
/// the defaults of the mesh: supplied values win, and any extra keys that have
/// no default are kept as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: BTreeMap<String, AttrValue>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes holding the coordinates `x`, `y` and `z`.
    pub fn xyz(x: f64, y: f64, z: f64) -> Self {
        let mut out = Self::new();
        out.set("x", x);
        out.set("y", y);
        out.set("z", z);
        out
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) -> Option<AttrValue> {
        self.values.insert(name.to_string(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.values.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Read a numeric attribute.
    pub fn float(&self, name: &str) -> Result<f64, Error> {
        self.values
            .get(name)
            .ok_or_else(|| Error::MissingAttribute(name.to_string()))?
            .as_float()
            .ok_or_else(|| Error::AttributeTypeMismatch(name.to_string()))
    }

    /// Overwrite these attributes with all the values in `other`.
    pub fn update(&mut self, other: &Attributes) {
        for (k, v) in &other.values {
            self.values.insert(k.clone(), v.clone());
        }
    }

    /// Copy of these attributes with `other` merged over them.
    pub fn merged(&self, other: &Attributes) -> Attributes {
        let mut out = self.clone();
        out.update(other);
        out
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Attributes {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{AttrValue, Attributes};
    use crate::error::Error;

    #[test]
    fn t_merge_over_defaults() {
        let defaults = Attributes::xyz(0.0, 0.0, 0.0);
        let user: Attributes = [("x", AttrValue::from(1.5)), ("load", AttrValue::from(true))]
            .into_iter()
            .collect();
        let merged = defaults.merged(&user);
        assert_eq!(merged.len(), 4);
        assert_eq!(merged.float("x").expect("Missing x"), 1.5);
        assert_eq!(merged.float("y").expect("Missing y"), 0.0);
        assert_eq!(merged.get("load").and_then(|v| v.as_bool()), Some(true));
        // The defaults are untouched.
        assert_eq!(defaults.float("x").expect("Missing x"), 0.0);
    }

    #[test]
    fn t_float_access() {
        let mut attrs = Attributes::new();
        attrs.set("count", 3i64);
        attrs.set("name", "support");
        assert_eq!(attrs.float("count").expect("Cannot read count"), 3.0);
        assert!(matches!(
            attrs.float("name"),
            Err(Error::AttributeTypeMismatch(name)) if name == "name"
        ));
        assert!(matches!(
            attrs.float("missing"),
            Err(Error::MissingAttribute(name)) if name == "missing"
        ));
        assert_eq!(attrs.remove("count"), Some(AttrValue::Int(3)));
        assert!(!attrs.contains("count"));
    }
}
