//! Error types.

use thiserror::Error;

use crate::controller::DeviceId;

#[derive(Error, Debug)]
pub enum Error {
    /// Option label or value outside of its domain.
    #[error("invalid {field}: {value:?}")]
    InvalidOption { field: &'static str, value: String },

    #[error("no signal tower connected")]
    DeviceUnavailable,

    #[error("unsupported device: {0}")]
    UnsupportedDevice(DeviceId),

    /// Command built for a different model than the connected one.
    #[error("{found} command can not be sent to {expected}")]
    ModelMismatch { expected: &'static str, found: &'static str },

    #[error("HID transport failure: {0}")]
    Transport(#[from] hidapi::HidError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_option(field: &'static str, value: impl ToString) -> Self {
        Error::InvalidOption { field, value: value.to_string() }
    }
}
