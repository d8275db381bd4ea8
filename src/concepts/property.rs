//! Property — a reified name/value characteristic.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::registry::{ClassTag, PROPERTY_CLASS};

/// A named value characterizing a Concept or a Relationship edge.
///
/// A property is owned by exactly one concept or one edge; it has no
/// independent lifecycle. The value is deliberately untyped
/// ([`serde_json::Value`]); the property's class tag carries its meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    class: ClassTag,
    name: String,
    value: Value,
}

impl Property {
    /// Create a property of the root `Property` class.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            class: ClassTag::new(PROPERTY_CLASS),
            name: name.into(),
            value,
        }
    }

    /// Create a property of a specific property class.
    pub fn with_class(class: ClassTag, name: impl Into<String>, value: Value) -> Self {
        Self {
            class,
            name: name.into(),
            value,
        }
    }

    /// The property's class tag.
    pub fn class(&self) -> &ClassTag {
        &self.class
    }

    /// The property's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the property.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The property's value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Replace the property's value.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_new_uses_root_class() {
        let p = Property::new("color", json!("red"));
        assert_eq!(p.class().as_str(), PROPERTY_CLASS);
        assert_eq!(p.name(), "color");
        assert_eq!(p.value(), &json!("red"));
    }

    #[test]
    fn test_property_value_mutation() {
        let mut p = Property::with_class(ClassTag::new("Weight"), "weight", json!(10));
        p.set_value(json!(12));
        assert_eq!(p.value(), &json!(12));
        p.set_name("mass");
        assert_eq!(p.name(), "mass");
    }
}
