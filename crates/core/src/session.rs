//! Evaluation session: the state one pass mutates.
//!
//! A session owns the context stack, the error accumulator, and the root
//! definition of the pass in progress. Nested blocks receive `&mut Session`
//! explicitly, so independent sessions never share state and each test can
//! start from a fresh one.

use crate::config::SessionConfig;
use crate::context::{ContextStack, DefinitionPath, Scope};
use crate::definition::{AttributeDefinition, Object};
use crate::error::{DslError, DslErrors, ErrorAccumulator, Provenance};
use std::ops::{Deref, DerefMut};

#[derive(Debug, Default)]
pub struct Session {
    config: SessionConfig,
    stack: ContextStack,
    errors: ErrorAccumulator,
    root: Option<AttributeDefinition>,
}

/// Outcome of one pass: the root as built, plus every error recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub root: AttributeDefinition,
    pub errors: Vec<DslError>,
}

impl Evaluation {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn object(&self) -> Option<&Object> {
        self.root.object()
    }

    /// The root, or the errors if any were recorded. A failed pass never
    /// hands out its tree.
    pub fn into_result(self) -> Result<AttributeDefinition, DslErrors> {
        if self.errors.is_empty() {
            Ok(self.root)
        } else {
            Err(DslErrors(self.errors))
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Session {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Errors recorded so far in the current pass.
    pub fn errors(&self) -> &[DslError] {
        self.errors.all()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Path of the definition currently open for declaration.
    pub fn current(&self) -> Option<&DefinitionPath> {
        self.stack.current()
    }

    /// Run one pass against `root`: reset the accumulator, open the root,
    /// evaluate `block`, close the root and hand back the result.
    #[track_caller]
    pub fn run<F>(&mut self, root: AttributeDefinition, block: F) -> Evaluation
    where
        F: FnOnce(&mut Session),
    {
        if self.root.is_some() {
            let err = DslError::context("evaluation pass started while another pass is open")
                .at(Provenance::caller());
            self.errors.record(err.clone());
            return Evaluation {
                root,
                errors: vec![err],
            };
        }

        self.errors.reset_pass();
        self.stack.clear();
        let mut pass = OpenPass::install(self, root);
        tracing::debug!("evaluation pass started");
        {
            let mut scope = Scope::enter(&mut *pass, DefinitionPath::root());
            block(&mut *scope);
        }
        let root = pass.root.take().unwrap_or_default();
        drop(pass);
        tracing::debug!(errors = self.errors.len(), "evaluation pass finished");
        Evaluation {
            root,
            errors: self.errors.all().to_vec(),
        }
    }

    /// Run one pass against a fresh, untyped root.
    #[track_caller]
    pub fn evaluate<F>(&mut self, block: F) -> Evaluation
    where
        F: FnOnce(&mut Session),
    {
        self.run(AttributeDefinition::new(), block)
    }

    pub(crate) fn record(&mut self, error: DslError) {
        self.errors.record(error);
    }

    pub(crate) fn stack_mut(&mut self) -> &mut ContextStack {
        &mut self.stack
    }

    pub(crate) fn enter(&mut self, path: DefinitionPath) -> Scope<'_> {
        Scope::enter(self, path)
    }

    /// Resolve a path against the root of the pass in progress.
    pub(crate) fn definition_mut(&mut self, path: &DefinitionPath) -> Option<&mut AttributeDefinition> {
        let mut def = self.root.as_mut()?;
        for name in path.segments() {
            def = def.object_mut()?.get_mut(name)?;
        }
        Some(def)
    }

    /// The definition on top of the stack, or a context error.
    pub(crate) fn current_definition_mut(&mut self) -> Result<&mut AttributeDefinition, DslError> {
        let path = self
            .stack
            .current()
            .cloned()
            .ok_or_else(|| DslError::context("declaration outside any container"))?;
        self.definition_mut(&path)
            .ok_or_else(|| DslError::context(format!("open definition {} no longer resolves", path)))
    }
}

/// Holds a session's root open for one pass. Dropping it closes the pass,
/// including when the block unwinds.
struct OpenPass<'s> {
    session: &'s mut Session,
}

impl<'s> OpenPass<'s> {
    fn install(session: &'s mut Session, root: AttributeDefinition) -> Self {
        session.root = Some(root);
        OpenPass { session }
    }
}

impl Deref for OpenPass<'_> {
    type Target = Session;

    fn deref(&self) -> &Session {
        self.session
    }
}

impl DerefMut for OpenPass<'_> {
    fn deref_mut(&mut self) -> &mut Session {
        self.session
    }
}

impl Drop for OpenPass<'_> {
    fn drop(&mut self) {
        self.session.root = None;
    }
}

/// Evaluate `block` in a fresh session and return the root object, or every
/// error the pass recorded. An empty block yields an empty object.
#[track_caller]
pub fn evaluate<F>(block: F) -> Result<Object, DslErrors>
where
    F: FnOnce(&mut Session),
{
    let root = Session::new().evaluate(block).into_result()?;
    Ok(root.into_object().unwrap_or_default())
}
