// Schema validation for RUP protocol documents and agent outputs
//
// This crate compiles the RUP schema (a JSON Schema subset with `$defs` and
// internal `$ref`s) into a typed model, validates documents loaded by
// `rup-yaml` against it, and reports violations in a bounded, deterministic
// form.

pub mod config;
pub mod engine;
pub mod error;
pub mod formats;
pub mod report;
pub mod resolver;
pub mod schema;
pub mod store;
pub mod validator;

pub use config::EngineConfig;
pub use engine::{Outcome, Target, classify, validate_file, validate_output, validate_protocol};
pub use error::{
    Bound, DanglingReference, EngineError, InstancePath, PathSegment, SchemaError, SchemaPath,
    SchemaResult, VariantCombinator, Violation, ViolationKind,
};
pub use report::{DisplayCap, Report};
pub use resolver::{ResolvedSchema, resolve};
pub use schema::Schema;
pub use store::{DocumentType, SchemaStore};
pub use validator::{ValidatorOptions, validate, validate_with};
