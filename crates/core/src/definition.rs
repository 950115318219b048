//! Definition tree nodes: attribute definitions and the object types that
//! own them.

use crate::config::RedeclarePolicy;
use crate::types::DataType;
use crate::validation::Validation;
use indexmap::IndexMap;

/// Type an attribute reads as until something gives it another one.
static DEFAULT_TYPE: DataType = DataType::String;

// ──────────────────────────────────────────────
// Object
// ──────────────────────────────────────────────

/// Named child attributes of a record-shaped type.
///
/// Iteration follows declaration order; equality ignores it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    attributes: IndexMap<String, AttributeDefinition>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeDefinition> {
        self.attributes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeDefinition)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut AttributeDefinition> {
        self.attributes.get_mut(name)
    }

    pub(crate) fn insert(&mut self, name: String, attribute: AttributeDefinition) {
        self.attributes.insert(name, attribute);
    }
}

// ──────────────────────────────────────────────
// AttributeDefinition
// ──────────────────────────────────────────────

/// One named field: its type, description, and validation rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeDefinition {
    /// `None` until typed explicitly or by a first child declaration.
    data_type: Option<DataType>,
    description: String,
    validations: Vec<Validation>,
}

impl AttributeDefinition {
    /// An untyped definition, usable as the root container of a pass.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed(data_type: DataType) -> Self {
        AttributeDefinition {
            data_type: Some(data_type),
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(data_type: Option<DataType>, description: Option<String>) -> Self {
        AttributeDefinition {
            data_type,
            description: description.unwrap_or_default(),
            validations: Vec::new(),
        }
    }

    /// The effective type; the string primitive when none was given.
    pub fn data_type(&self) -> &DataType {
        self.data_type.as_ref().unwrap_or(&DEFAULT_TYPE)
    }

    pub fn explicit_type(&self) -> Option<&DataType> {
        self.data_type.as_ref()
    }

    pub fn is_default_type(&self) -> bool {
        self.data_type.is_none()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn validations(&self) -> &[Validation] {
        &self.validations
    }

    pub fn object(&self) -> Option<&Object> {
        self.data_type.as_ref().and_then(DataType::as_object)
    }

    /// Child attribute lookup for object-typed definitions.
    pub fn attribute(&self, name: &str) -> Option<&AttributeDefinition> {
        self.object().and_then(|o| o.get(name))
    }

    pub fn into_object(self) -> Option<Object> {
        match self.data_type {
            Some(DataType::Object(o)) => Some(o),
            _ => None,
        }
    }

    pub(crate) fn object_mut(&mut self) -> Option<&mut Object> {
        match self.data_type.as_mut() {
            Some(DataType::Object(o)) => Some(o),
            _ => None,
        }
    }

    /// The object children are declared into. An untyped definition becomes
    /// an empty object here; an explicit non-object type is returned as the
    /// error.
    pub(crate) fn children_mut(&mut self) -> Result<&mut Object, DataType> {
        match self
            .data_type
            .get_or_insert_with(|| DataType::Object(Object::new()))
        {
            DataType::Object(o) => Ok(o),
            other => Err(other.clone()),
        }
    }

    pub(crate) fn push_validation(&mut self, validation: Validation) {
        self.validations.push(validation);
    }

    /// Fold a redeclaration into this definition. On a type conflict nothing
    /// is changed and the existing type is returned.
    ///
    /// Two object types merge by name rather than compare by contents, so a
    /// second contribution to an object adds to it instead of clashing with
    /// the children the first one declared.
    pub(crate) fn merge(
        &mut self,
        data_type: Option<DataType>,
        description: Option<String>,
        policy: RedeclarePolicy,
    ) -> Result<(), DataType> {
        if let Some(new_type) = data_type {
            match (&mut self.data_type, new_type) {
                (Some(DataType::Object(existing)), DataType::Object(incoming)) => {
                    let mut merged = existing.clone();
                    merged
                        .absorb(incoming, policy)
                        .map_err(|_| DataType::Object(existing.clone()))?;
                    *existing = merged;
                }
                (slot, new_type) => {
                    if let Some(existing) = slot.as_ref().filter(|t| **t != new_type) {
                        if policy == RedeclarePolicy::Reject {
                            return Err(existing.clone());
                        }
                        tracing::debug!(from = %existing, to = %new_type, "overriding attribute type");
                    }
                    *slot = Some(new_type);
                }
            }
        }
        if let Some(d) = description.filter(|d| !d.is_empty()) {
            self.description = d;
        }
        Ok(())
    }
}

impl Object {
    /// Fold another object's attributes into this one: new names are
    /// appended, shared names merge like a redeclaration. Stops at the first
    /// conflict, leaving `self` partially merged; callers merge into a copy.
    fn absorb(&mut self, incoming: Object, policy: RedeclarePolicy) -> Result<(), DataType> {
        for (name, def) in incoming.attributes {
            match self.attributes.get_mut(&name) {
                Some(current) => {
                    current.merge(def.data_type, Some(def.description), policy)?;
                    current.validations.extend(def.validations);
                }
                None => {
                    self.attributes.insert(name, def);
                }
            }
        }
        Ok(())
    }
}
