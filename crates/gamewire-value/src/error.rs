/// Errors raised while decoding a binary value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The tag byte does not start any supported encoding.
    #[error("unknown tag byte {0:#04x}")]
    UnknownTag(u8),

    /// A declared length or fixed-width number runs past the end of the input.
    #[error("truncated value: need {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A decoded integer does not fit the requested width.
    #[error("integer {value} does not fit in {target}")]
    Overflow { value: i128, target: &'static str },

    /// String bytes are not valid UTF-8.
    #[error("string payload is not valid UTF-8")]
    InvalidEncoding,

    /// A mapping key was not a string.
    #[error("mapping key must be a string, found {0}")]
    InvalidKey(&'static str),

    /// A record could not be bound because a field is absent.
    #[error("record {record} is missing field {field}")]
    MissingField { record: String, field: String },

    /// Strict record binding met a key that is not a declared field.
    #[error("record {record} has no field {field}")]
    UnknownField { record: String, field: String },

    /// The decoded value has a different kind than the shape requires.
    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Containers were nested deeper than the reader allows.
    #[error("value nested deeper than {0} levels")]
    DepthExceeded(usize),

    /// Bytes were left over after a complete value.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

pub type Result<T> = std::result::Result<T, ValueError>;
