//! Schema parser modules, one per node kind.

pub(super) mod arrays;
pub(super) mod combinators;
pub(super) mod objects;
pub(super) mod r#ref;
pub(super) mod scalars;

pub(super) use arrays::parse_array_schema;
pub(super) use combinators::parse_combinator;
pub(super) use objects::parse_object_schema;
pub(super) use r#ref::parse_ref_schema;
pub(super) use scalars::parse_scalar_schema;
