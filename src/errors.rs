//! Driver errors and the recovery action each one calls for

use core::{convert::Infallible, fmt};

/// Driver error
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Error {
    /// SPI bus transfer failed
    Spi,

    /// Chip select pin could not be driven
    Pin,

    /// Argument out of the accepted range
    InvalidParameter,

    /// Register or channel base address not valid for the field
    InvalidAddress,

    /// Output channel number out of range
    InvalidChannel,

    /// Requested frequency can not be synthesized
    InvalidFrequency,

    /// Register holds a value with no matching enum variant
    InvalidFieldValue,

    /// Part id read back from the device does not match the configured part
    PartId { expected: u8, found: u8 },

    /// Self-clearing bit did not clear in time
    Timeout,

    /// Requested cache state needs hardware read-modify-write or write-only mode
    CacheUnavailable,

    /// Read requested while the interface is configured write-only
    WriteOnly,

    /// Read cache has no room for another entry
    CacheFull,

    /// Bit-field start bit outside of an 8-bit register
    StartBitRange,

    /// Masked write requested with hardware read-modify-write disabled
    HwRmwUnavailable,

    /// SPI transaction does not fit the transfer buffer
    BufferOverflow,
}

/// Recovery action reported alongside an error, vendor API compatible codes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    NoAction,
    CheckTimer,
    CheckParam,
    ResetInterface,
    ResetModule,
    ResetFull,
    ResetSpi,
    ResetCache,
    FlushCache,
}

impl RecoveryAction {
    /// Integer code as returned by the vendor API
    pub fn code(self) -> i32 {
        match self {
            RecoveryAction::NoAction => 0,
            RecoveryAction::CheckTimer => -1,
            RecoveryAction::CheckParam => -2,
            RecoveryAction::ResetInterface => -3,
            RecoveryAction::ResetModule => -4,
            RecoveryAction::ResetFull => -5,
            RecoveryAction::ResetSpi => -6,
            RecoveryAction::ResetCache => -7,
            RecoveryAction::FlushCache => -8,
        }
    }
}

impl Error {
    /// What the caller is expected to do about this error.
    pub fn action(&self) -> RecoveryAction {
        match self {
            Error::Spi | Error::Pin => RecoveryAction::ResetInterface,
            Error::InvalidParameter
            | Error::InvalidAddress
            | Error::InvalidChannel
            | Error::InvalidFrequency
            | Error::InvalidFieldValue
            | Error::CacheUnavailable
            | Error::WriteOnly
            | Error::HwRmwUnavailable => RecoveryAction::CheckParam,
            Error::PartId { .. } => RecoveryAction::ResetFull,
            Error::Timeout => RecoveryAction::CheckTimer,
            Error::CacheFull | Error::StartBitRange => RecoveryAction::FlushCache,
            Error::BufferOverflow => RecoveryAction::ResetSpi,
        }
    }
}

impl From<Infallible> for Error {
    fn from(x: Infallible) -> Self {
        match x {}
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Spi => f.write_str("SPI transfer failed"),
            Error::Pin => f.write_str("chip select pin error"),
            Error::InvalidParameter => f.write_str("invalid parameter"),
            Error::InvalidAddress => f.write_str("invalid address"),
            Error::InvalidChannel => f.write_str("invalid channel"),
            Error::InvalidFrequency => f.write_str("frequency out of range"),
            Error::InvalidFieldValue => f.write_str("unexpected register field value"),
            Error::PartId { expected, found } => {
                write!(f, "part id mismatch: expected {:#04x}, found {:#04x}", expected, found)
            }
            Error::Timeout => f.write_str("timed out"),
            Error::CacheUnavailable => f.write_str("cache state requires HW RMW or write-only mode"),
            Error::WriteOnly => f.write_str("read not allowed in write-only mode"),
            Error::CacheFull => f.write_str("read cache full"),
            Error::StartBitRange => f.write_str("start bit out of range"),
            Error::HwRmwUnavailable => f.write_str("HW RMW disabled"),
            Error::BufferOverflow => f.write_str("SPI buffer overflow"),
        }
    }
}
