//! Attribute resolution: turn one attribute declaration into a new or merged
//! entry of the open object.
//!
//! [`AttributeSpec`] carries the optional parts of a declaration (type,
//! description, nested block) and [`Session::declare`] resolves it. The
//! `attribute*` methods are shorthands for the usual call shapes.

use crate::context::DefinitionPath;
use crate::definition::AttributeDefinition;
use crate::error::{DslError, Provenance};
use crate::session::Session;
use crate::types::DataType;

/// Deferred declarations evaluated against the attribute they belong to.
pub type Block<'b> = Box<dyn FnOnce(&mut Session) + 'b>;

/// A single attribute declaration. Unset parts are resolved by presence:
/// no type means the default string type (or object, once children are
/// declared), no description leaves the existing one, no block declares
/// nothing nested.
pub struct AttributeSpec<'b> {
    name: String,
    data_type: Option<DataType>,
    description: Option<String>,
    block: Option<Block<'b>>,
}

impl<'b> AttributeSpec<'b> {
    pub fn new(name: impl Into<String>) -> Self {
        AttributeSpec {
            name: name.into(),
            data_type: None,
            description: None,
            block: None,
        }
    }

    pub fn typed(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    /// Only valid together with an explicit type.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with<F>(mut self, block: F) -> Self
    where
        F: FnOnce(&mut Session) + 'b,
    {
        self.block = Some(Box::new(block));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for AttributeSpec<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeSpec")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("description", &self.description)
            .field("block", &self.block.is_some())
            .finish()
    }
}

impl Session {
    /// Declare an attribute on the open definition.
    ///
    /// Errors are recorded on the session and the declaration is skipped;
    /// the caller keeps going with its next declaration.
    #[track_caller]
    pub fn declare(&mut self, spec: AttributeSpec<'_>) {
        let location = Provenance::caller();
        let AttributeSpec {
            name,
            data_type,
            description,
            block,
        } = spec;

        if name.is_empty() {
            self.record(DslError::signature("attribute name must not be empty").at(location));
            return;
        }
        if description.is_some() && data_type.is_none() {
            self.record(
                DslError::signature(format!(
                    "description of attribute {} requires an explicit type",
                    name
                ))
                .at(location),
            );
            return;
        }
        let Some(parent) = self.current().cloned() else {
            self.record(
                DslError::context(format!(
                    "attribute {} declared outside any container",
                    name
                ))
                .at(location),
            );
            return;
        };

        if let Err(err) = self.resolve(&parent, &name, data_type, description) {
            self.record(err.at(location));
            return;
        }

        if let Some(block) = block {
            let mut scope = self.enter(parent.child(&name));
            block(&mut *scope);
        }
    }

    /// Insert or merge `name` into the object of the definition at `parent`.
    fn resolve(
        &mut self,
        parent: &DefinitionPath,
        name: &str,
        data_type: Option<DataType>,
        description: Option<String>,
    ) -> Result<(), DslError> {
        let policy = self.config().redeclaration;
        let container = self.definition_mut(parent).ok_or_else(|| {
            DslError::context(format!("open definition {} no longer resolves", parent))
        })?;
        let object = container.children_mut().map_err(|existing| {
            DslError::conflict(format!(
                "cannot declare attribute {} in {}: type {} is not an object",
                name, parent, existing
            ))
        })?;

        match object.get_mut(name) {
            None => {
                tracing::debug!(attribute = name, parent = %parent, "declared attribute");
                object.insert(
                    name.to_owned(),
                    AttributeDefinition::from_parts(data_type, description),
                );
            }
            Some(existing) => {
                let redeclared = data_type.clone();
                existing
                    .merge(data_type, description, policy)
                    .map_err(|previous| {
                        DslError::conflict(format!(
                            "incompatible redeclaration of attribute {}: declared as {}, redeclared as {}",
                            name,
                            previous,
                            redeclared.map(|t| t.to_string()).unwrap_or_default()
                        ))
                    })?;
                tracing::debug!(attribute = name, parent = %parent, "merged attribute redeclaration");
            }
        }
        Ok(())
    }

    /// `(name)`: a string attribute.
    #[track_caller]
    pub fn attribute(&mut self, name: &str) {
        self.declare(AttributeSpec::new(name));
    }

    /// `(name, type)`
    #[track_caller]
    pub fn attribute_typed(&mut self, name: &str, data_type: DataType) {
        self.declare(AttributeSpec::new(name).typed(data_type));
    }

    /// `(name, type, description)`
    #[track_caller]
    pub fn attribute_described(&mut self, name: &str, data_type: DataType, description: &str) {
        self.declare(
            AttributeSpec::new(name)
                .typed(data_type)
                .described(description),
        );
    }

    /// `(name, block)`
    #[track_caller]
    pub fn attribute_with<'b, F>(&mut self, name: &str, block: F)
    where
        F: FnOnce(&mut Session) + 'b,
    {
        self.declare(AttributeSpec::new(name).with(block));
    }

    /// `(name, type, block)`
    #[track_caller]
    pub fn attribute_typed_with<'b, F>(&mut self, name: &str, data_type: DataType, block: F)
    where
        F: FnOnce(&mut Session) + 'b,
    {
        self.declare(AttributeSpec::new(name).typed(data_type).with(block));
    }

    /// `(name, type, description, block)`
    #[track_caller]
    pub fn attribute_described_with<'b, F>(
        &mut self,
        name: &str,
        data_type: DataType,
        description: &str,
        block: F,
    ) where
        F: FnOnce(&mut Session) + 'b,
    {
        self.declare(
            AttributeSpec::new(name)
                .typed(data_type)
                .described(description)
                .with(block),
        );
    }
}
