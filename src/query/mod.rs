//! Filter compilation and segment execution.
//!
//! Input ([`types`]) is resolved against a [`crate::schema::Schema`], validated,
//! and built into a [`Predicate`]; segments combine several predicates with set
//! operations and are then ordered and paged.

/// Upper bound on dotted path segments.
pub(crate) const MAX_PATH_DEPTH: usize = 32;

mod builder;
mod compile;
mod eval;
mod exec;
mod page;
mod parse;
mod path;
mod predicate;
mod source;
mod types;
pub mod validate;

pub use compile::Compiler;
pub use eval::{compare_literal, compare_records, compare_values, eval_predicate, resolve_field, sort_records};
pub use exec::{Cancellation, CompiledSegment, CompiledSet, RecordKey};
pub use page::{PageWindow, PagedResult};
pub use parse::{parse_condition_json, parse_group_json, parse_segment_json, segment_to_json};
pub use path::{Hop, PathSegment, ResolvedPath, resolve_path};
pub use predicate::{CmpOp, FieldRef, LIKE_ESCAPE, LikePattern, Literal, OrderKey, Predicate, escape_like};
pub use source::{AsyncRecordSource, MemorySource, RecordSource};
pub use types::{
    Arity, Combinator, Condition, ConditionGroup, ConditionSet, Connector, DataType, Direction, Operator, OrderSpec,
    PageSpec, Segment,
};
