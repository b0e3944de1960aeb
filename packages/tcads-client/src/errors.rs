//! The client's error taxonomy, composing the wire-layer errors from [`tcads_core`]
//! with the resolution, codec, and session-level failures unique to this crate.

use tcads_core::ads::AdsReturnCode;
use tcads_core::protocol::ProtocolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("not connected")]
    NotConnected,

    #[error("session disconnected")]
    Disconnected,

    #[error("request timed out")]
    RequestTimeout,

    #[error("invoke ID {0} is already in use")]
    DuplicateInvokeId(u32),

    #[error("target returned ADS error: {0:?}")]
    AdsError(AdsReturnCode),

    #[error("frame too short: expected at least {expected} bytes, got {got}")]
    FrameTooShort { expected: usize, got: usize },

    #[error("unknown ADS command: {0:#06x}")]
    UnknownCommand(u16),

    #[error("invalid data on the wire: {0}")]
    DecodeInvalid(String),

    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("invalid tag path {path:?}: {reason}")]
    TagPathInvalid { path: String, reason: String },

    #[error("sub-item not found: {0}")]
    SubItemNotFound(String),

    #[error("array dimension mismatch: tag has {tag_dims} dimension(s), path supplied {supplied}")]
    ArrayDimensionMismatch { tag_dims: usize, supplied: usize },

    #[error("index {index} out of bounds for dimension [{start}, {end})")]
    IndexOutOfBounds { index: i64, start: i32, end: i64 },

    #[error("structure shape mismatch: expected keys {expected:?}, got {got:?}")]
    StructureShapeMismatch {
        expected: Vec<String>,
        got: Vec<String>,
    },

    #[error("array shape mismatch: expected {expected} element(s), got {got}")]
    ArrayShapeMismatch { expected: usize, got: usize },

    #[error("unsupported type: {0}")]
    UnsupportedType(String),

    #[error("too many notification handles (limit is {limit})")]
    TooManyHandles { limit: usize },

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
