//! Type token catalog: primitive and composite data types.

use crate::definition::Object;
use std::fmt;

/// The type of an attribute. Comparison is structural: two `Object` types
/// are equal iff their attribute mappings are equal.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Any,
    Boolean,
    Integer,
    Number,
    String,
    Array(Box<DataType>),
    /// Map with keys of the first type and values of the second.
    Hash(Box<DataType>, Box<DataType>),
    Object(Object),
}

impl DataType {
    pub fn array_of(element: DataType) -> Self {
        DataType::Array(Box::new(element))
    }

    pub fn hash_of(key: DataType, value: DataType) -> Self {
        DataType::Hash(Box::new(key), Box::new(value))
    }

    pub fn object(object: Object) -> Self {
        DataType::Object(object)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            DataType::Any
                | DataType::Boolean
                | DataType::Integer
                | DataType::Number
                | DataType::String
        )
    }

    pub fn is_object(&self) -> bool {
        matches!(self, DataType::Object(_))
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            DataType::Object(o) => Some(o),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Any => f.write_str("any"),
            DataType::Boolean => f.write_str("boolean"),
            DataType::Integer => f.write_str("integer"),
            DataType::Number => f.write_str("number"),
            DataType::String => f.write_str("string"),
            DataType::Array(elem) => write!(f, "array<{}>", elem),
            DataType::Hash(key, value) => write!(f, "hash<{}, {}>", key, value),
            DataType::Object(o) => {
                let names: Vec<&str> = o.names().collect();
                write!(f, "object{{{}}}", names.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AttributeDefinition;

    #[test]
    fn composite_types_compare_structurally() {
        assert_eq!(
            DataType::array_of(DataType::Integer),
            DataType::array_of(DataType::Integer)
        );
        assert_ne!(
            DataType::array_of(DataType::Integer),
            DataType::array_of(DataType::String)
        );

        let mut a = Object::new();
        a.insert("id".to_string(), AttributeDefinition::typed(DataType::Integer));
        let mut b = Object::new();
        b.insert("id".to_string(), AttributeDefinition::typed(DataType::Integer));
        assert_eq!(DataType::object(a), DataType::object(b));
    }

    #[test]
    fn display_names() {
        assert_eq!(DataType::String.to_string(), "string");
        assert_eq!(
            DataType::hash_of(DataType::String, DataType::array_of(DataType::Number))
                .to_string(),
            "hash<string, array<number>>"
        );

        let mut o = Object::new();
        o.insert("a".to_string(), AttributeDefinition::new());
        o.insert("b".to_string(), AttributeDefinition::new());
        assert_eq!(DataType::object(o).to_string(), "object{a, b}");
    }

    #[test]
    fn primitive_classification() {
        assert!(DataType::Boolean.is_primitive());
        assert!(!DataType::array_of(DataType::Any).is_primitive());
        assert!(DataType::object(Object::new()).is_object());
        assert!(DataType::Integer.as_object().is_none());
    }
}
