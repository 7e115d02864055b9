//! Scene-description property accumulator
//!
//! The renderer-facing output of a pass is a flat set of property statements
//! (`path = value`). The accumulator is append/merge only: entries are added
//! or replaced, never deleted mid-frame. A `BTreeMap` keeps iteration order
//! deterministic for tests and diffing.

use std::collections::BTreeMap;

/// A single property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Boolean flag
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Float scalar
    Float(f32),
    /// String value
    Str(String),
    /// Float list (transforms, colors)
    FloatList(Vec<f32>),
    /// String list
    StrList(Vec<String>),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Vec<f32>> for PropertyValue {
    fn from(value: Vec<f32>) -> Self {
        Self::FloatList(value)
    }
}

/// Ordered, write-only accumulator of renderer property statements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneProperties {
    entries: BTreeMap<String, PropertyValue>,
}

impl SceneProperties {
    /// Create an empty property set
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property, replacing any previous value at the same path
    pub fn set(&mut self, path: impl Into<String>, value: impl Into<PropertyValue>) {
        self.entries.insert(path.into(), value.into());
    }

    /// Merge another property set into this one; `other`'s values win on
    /// conflicting paths.
    pub fn merge(&mut self, other: SceneProperties) {
        self.entries.extend(other.entries);
    }

    /// Look up a property by path
    pub fn get(&self, path: &str) -> Option<&PropertyValue> {
        self.entries.get(path)
    }

    /// Iterate entries in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of property statements
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no properties have been accumulated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut props = SceneProperties::new();
        props.set("scene.objects.cube.shape", "cube_shape");
        props.set("scene.objects.cube.id", PropertyValue::Int(3));

        assert_eq!(props.len(), 2);
        assert_eq!(
            props.get("scene.objects.cube.shape"),
            Some(&PropertyValue::Str("cube_shape".into()))
        );
    }

    #[test]
    fn test_replace_keeps_single_entry() {
        let mut props = SceneProperties::new();
        props.set("a.b", PropertyValue::Int(1));
        props.set("a.b", PropertyValue::Int(2));
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("a.b"), Some(&PropertyValue::Int(2)));
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = SceneProperties::new();
        base.set("x", PropertyValue::Int(1));
        base.set("y", PropertyValue::Int(1));

        let mut other = SceneProperties::new();
        other.set("y", PropertyValue::Int(2));
        other.set("z", PropertyValue::Int(3));

        base.merge(other);
        assert_eq!(base.len(), 3);
        assert_eq!(base.get("y"), Some(&PropertyValue::Int(2)));
    }

    #[test]
    fn test_iteration_is_ordered() {
        let mut props = SceneProperties::new();
        props.set("b", PropertyValue::Int(2));
        props.set("a", PropertyValue::Int(1));
        let paths: Vec<&str> = props.iter().map(|(path, _)| path).collect();
        assert_eq!(paths, vec!["a", "b"]);
    }
}
