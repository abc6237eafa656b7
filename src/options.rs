//! Option labels shared by all signal tower models.

use clap::ValueEnum;

use crate::error::{Error, Result};

/// Length of every command report.
pub const REPORT_LEN: usize = 8;

/// Report ID used for all output reports.
pub const REPORT_ID: u8 = 0;

/// Named option with a device register code.
///
/// The label table is the list of `ValueEnum` variants, so the names accepted on
/// the command line are exactly the names accepted by [`OptionLabel::from_label`].
pub trait OptionLabel: ValueEnum + Copy {
    /// Register code for this option.
    fn code(self) -> u8;

    /// Look up an option by its label.
    ///
    /// Labels are case-sensitive. Unknown labels are reported for `field`.
    fn from_label(field: &'static str, label: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(label, false)
            .map_err(|_| Error::invalid_option(field, label))
    }

    /// Label of this option.
    fn label(self) -> String {
        self.to_possible_value().map(|value| value.get_name().to_owned()).unwrap_or_default()
    }
}

/// All labels of an option, comma separated.
pub fn possible_labels<T: OptionLabel>() -> String {
    T::value_variants().iter().map(|variant| variant.label()).collect::<Vec<_>>().join(", ")
}

/// Buzzer or alarm repeat count.
///
/// The count is packed into the high nibble of its register, so it is limited
/// to `0..=15`.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Count(u8);

impl Count {
    pub const MAX: u8 = 0x0f;

    pub fn new(field: &'static str, count: u8) -> Result<Self> {
        if count > Self::MAX {
            return Err(Error::invalid_option(field, count));
        }

        Ok(Self(count))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Count {
    fn default() -> Self {
        Self(Self::MAX)
    }
}

/// Pack two 4-bit values into one byte, `high` first.
///
/// Neither value is masked. Callers must keep both below 16.
pub const fn pack_nibbles(high: u8, low: u8) -> u8 {
    (high << 4) | low
}
