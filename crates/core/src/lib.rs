//! shapedsl-core: declarative attribute DSL engine.
//!
//! Builds a typed schema tree (an object of named attributes, each with a
//! type, a description and validation rules) from nested declaration calls
//! evaluated in order against a [`Session`].
//!
//! ```
//! use shapedsl_core::{evaluate, DataType, Validation};
//!
//! let object = evaluate(|s| {
//!     s.attribute_typed("id", DataType::Integer);
//!     s.attribute_typed_with("tags", DataType::String, |s| s.enumeration(["a", "b"]));
//! })
//! .unwrap();
//!
//! assert_eq!(object.get("id").unwrap().data_type(), &DataType::Integer);
//! assert_eq!(
//!     object.get("tags").unwrap().validations(),
//!     &[Validation::enumeration(["a", "b"]).unwrap()]
//! );
//! ```
//!
//! # Public API
//!
//! - [`Session`] -- evaluation state for one pass at a time
//! - [`evaluate()`] -- run one pass in a fresh session
//! - [`AttributeSpec`] -- a single declaration, resolved by [`Session::declare`]
//! - Tree types: [`DataType`], [`Object`], [`AttributeDefinition`], [`Validation`]
//! - Errors: [`DslError`], [`DslErrors`], [`ErrorKind`]

pub mod attribute;
pub mod config;
pub mod context;
pub mod definition;
pub mod error;
pub mod session;
pub mod types;
pub mod validation;

// ── Convenience re-exports ───────────────────────────────────────────

pub use attribute::{AttributeSpec, Block};
pub use config::{RedeclarePolicy, SessionConfig};
pub use context::{ContextStack, DefinitionPath};
pub use definition::{AttributeDefinition, Object};
pub use error::{DslError, DslErrors, ErrorAccumulator, ErrorKind, Provenance};
pub use session::{evaluate, Evaluation, Session};
pub use types::DataType;
pub use validation::{Format, Validation, ValidationError};
