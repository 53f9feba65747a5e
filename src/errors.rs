use thiserror::Error;

/// Broad classification of a [`FilterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The filter input is structurally or lexically invalid.
    Validation,
    /// The caller broke the calling contract (missing input, missing key, cancellation).
    Contract,
    /// A collaborator (backing store, JSON, config file) failed.
    External,
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("condition sets must have unique sort values")]
    SetsUniqueSort,

    #[error("conditions must have unique sort values within a group")]
    ConditionsUniqueSort,

    #[error("sub condition groups must have unique sort values within a group")]
    SubConditionsGroupsUniqueSort,

    #[error("condition set {sort} requires an intersection operator")]
    RequiredIntersection { sort: i64 },

    #[error("invalid field: {0}")]
    InvalidField(String),

    #[error("invalid value for field {field}")]
    InvalidValue { field: String },

    #[error("operator {operator} requires at least one value")]
    RequiredValues { operator: String },

    #[error("operator {operator} does not accept values")]
    NotRequiredValues { operator: String },

    #[error("operator {operator} requires exactly two values")]
    RequiredTwoValue { operator: String },

    #[error("operator {0} requires exactly one value")]
    RequiredOneValue(String),

    #[error("value '{value}' is not a valid {data_type}")]
    InvalidFormat { value: String, data_type: String },

    #[error("invalid page number: {0}")]
    InvalidPageNumber(i64),

    #[error("invalid page size: {0}")]
    InvalidPageSize(i64),

    #[error("operator {operator} is not supported for {data_type} fields")]
    UnsupportedOperator { operator: String, data_type: String },

    #[error("operator {operator} accepts at most {max} values")]
    TooManyValues { operator: String, max: usize },

    #[error("condition groups nest deeper than {0} levels")]
    NestingTooDeep(usize),

    #[error("no filter specification supplied")]
    MissingSpec,

    #[error("schema {0} declares no record key; set operations need one")]
    MissingRecordKey(String),

    #[error("record key is null or not a scalar: {0}")]
    InvalidRecordKey(String),

    #[error("segment execution cancelled")]
    Cancelled,

    #[error("record source error: {0}")]
    Source(String),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl FilterError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::SetsUniqueSort => "SetsUniqueSort",
            Self::ConditionsUniqueSort => "ConditionsUniqueSort",
            Self::SubConditionsGroupsUniqueSort => "SubConditionsGroupsUniqueSort",
            Self::RequiredIntersection { .. } => "RequiredIntersection",
            Self::InvalidField(_) => "InvalidField",
            Self::InvalidValue { .. } => "InvalidValue",
            Self::RequiredValues { .. } => "RequiredValues",
            Self::NotRequiredValues { .. } => "NotRequiredValues",
            Self::RequiredTwoValue { .. } => "RequiredTwoValue",
            Self::RequiredOneValue(_) => "RequiredOneValue",
            Self::InvalidFormat { .. } => "InvalidFormat",
            Self::InvalidPageNumber(_) => "InvalidPageNumber",
            Self::InvalidPageSize(_) => "InvalidPageSize",
            Self::UnsupportedOperator { .. } => "UnsupportedOperator",
            Self::TooManyValues { .. } => "TooManyValues",
            Self::NestingTooDeep(_) => "NestingTooDeep",
            Self::MissingSpec => "MissingSpec",
            Self::MissingRecordKey(_) => "MissingRecordKey",
            Self::InvalidRecordKey(_) => "InvalidRecordKey",
            Self::Cancelled => "Cancelled",
            Self::Source(_) => "Source",
            Self::Json(_) => "Json",
            Self::Config(_) => "Config",
            Self::Io(_) => "Io",
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingSpec
            | Self::MissingRecordKey(_)
            | Self::InvalidRecordKey(_)
            | Self::Cancelled => ErrorKind::Contract,
            Self::Source(_) | Self::Json(_) | Self::Config(_) | Self::Io(_) => ErrorKind::External,
            _ => ErrorKind::Validation,
        }
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

impl From<std::io::Error> for FilterError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
