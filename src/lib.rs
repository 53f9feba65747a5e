pub mod config;
pub mod errors;
pub mod logger;
pub mod query;
pub mod schema;
pub mod utils;

pub use crate::config::CompilerConfig;
pub use crate::errors::{ErrorKind, FilterError, Result};
pub use crate::query::{
    Cancellation, CompiledSegment, Compiler, Condition, ConditionGroup, ConditionSet, DataType, MemorySource,
    Operator, PagedResult, Predicate, RecordSource, Segment,
};
pub use crate::schema::{FieldType, Record, Schema, Value};

/// Compiles `segment` against `schema` and runs it over `source`.
///
/// Condition sets are evaluated on scoped threads when
/// `config.parallel_sets` is set.
///
/// # Errors
/// Any compilation error, then source, record-key or cancellation errors.
pub fn execute_segment<S>(
    schema: &Schema,
    segment: &Segment,
    source: &S,
    config: &CompilerConfig,
) -> Result<PagedResult<S::Item>>
where
    S: RecordSource + Sync,
    S::Item: Send,
{
    let compiled = Compiler::with_config(schema, config.clone()).compile_segment(segment)?;
    let cancel = Cancellation::new();
    if config.parallel_sets {
        compiled.execute_parallel(source, &cancel)
    } else {
        compiled.execute_cancellable(source, &cancel)
    }
}

/// Same as [`execute_segment`] for a JSON segment.
///
/// # Errors
/// `MissingSpec` for `null`, `Json` for malformed input, then those of
/// [`execute_segment`].
pub fn execute_segment_json<S>(
    schema: &Schema,
    json: &str,
    source: &S,
    config: &CompilerConfig,
) -> Result<PagedResult<S::Item>>
where
    S: RecordSource + Sync,
    S::Item: Send,
{
    let segment = query::parse_segment_json(json)?;
    execute_segment(schema, &segment, source, config)
}

/// Sets up file logging from `FILTERSPEC_LOG_*` environment variables.
///
/// # Errors
/// Fails if the log directory cannot be created or log4rs is already initialised.
pub fn init() -> std::result::Result<(), Box<dyn std::error::Error>> {
    logger::configure_from_env()
}
