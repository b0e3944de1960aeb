use super::state_flag::StateFlag;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsError {
    #[error("Buffer too small for ADS Header: expected {expected}, found {found}")]
    HeaderBufferTooSmall { expected: usize, found: usize },

    #[error("Buffer too small for {item}: expected {expected}, found {found}")]
    InvalidBufferSize {
        item: &'static str,
        expected: usize,
        found: usize,
    },

    /// A length-prefixed or fixed-size field did not match the bytes actually available.
    #[error("Unexpected data length: expected at least {expected} bytes, got {got}")]
    UnexpectedDataLength { expected: usize, got: usize },

    /// Invalid command format or content
    #[error("Invalid ADS command: {0}")]
    InvalidCommand(#[from] AdsCommandError),

    #[error("Invalid ADS header: {0}")]
    InvalidHeader(#[from] AdsHeaderError),

    #[error("Invalid ADS return code: {0}")]
    InvalidReturnCode(#[from] AdsReturnCodeError),

    #[error("Invalid ADS state flags: {0}")]
    InvalidStateFlag(#[from] StateFlagError),

    #[error("Invalid ADS device state: {0}")]
    InvalidState(#[from] AdsStateError),

    #[error("Invalid ADS string: {0}")]
    InvalidString(#[from] AdsStringError),

    #[error("Invalid device version: {0}")]
    InvalidDeviceVersion(#[from] AdsDeviceVersionError),

    #[error("Invalid transmission mode: {0}")]
    InvalidTransMode(#[from] AdsTransModeError),

    #[error("Invalid notification handle: {0}")]
    InvalidNotificationHandle(#[from] AdsNotificationHandleError),

    #[error("Invalid Windows FILETIME: {0}")]
    InvalidFileTime(#[from] WindowsFileTimeError),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsHeaderError {
    #[error("Unexpected length: expected {expected} bytes, got {got} bytes")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsReturnCodeError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StateFlagError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },

    #[error("Unexpected state flags: expected one of {expected:?}, got {got:?}")]
    UnexpectedStateFlag {
        expected: Vec<StateFlag>,
        got: StateFlag,
    },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsCommandError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsStateError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsStringError {
    #[error("String exceeds buffer capacity: expected at most {expected} bytes, got {got}")]
    TooLong { expected: usize, got: usize },

    #[error("String contains characters that cannot be represented in Windows-1252")]
    EncodingError,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsDeviceVersionError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsTransModeError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AdsNotificationHandleError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum WindowsFileTimeError {
    #[error("Unexpected length: expected {expected} bytes, got {got}")]
    UnexpectedLength { expected: usize, got: usize },
}
