//! Signal tower controller abstraction.

use std::fmt::{self, Display, Formatter};

use bytes::Bytes;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lr6_usb::{self, Lr6Config, Lr6Usb};
use crate::ne_usb::{self, NeConfig, NeUsb};
use crate::options::REPORT_LEN;

/// PATLITE USB vendor ID.
pub const VENDOR_ID: u16 = 0x191a;

/// Product IDs which can be opened.
pub const PRODUCT_IDS: [u16; 2] = [ne_usb::PRODUCT_ID, lr6_usb::PRODUCT_ID];

/// HID signal tower controller.
pub(crate) trait SignalTower {
    /// HID vendor ID.
    fn vendor_id(&self) -> u16 {
        VENDOR_ID
    }

    /// HID product ID.
    fn product_id(&self) -> u16;

    /// Human readable model name.
    fn model_name(&self) -> &'static str;

    /// Convert a command to the controller-specific report.
    fn command_bytes(&self, command: &Command) -> Result<Bytes>;

    /// Report turning off all buzzers and LEDs.
    fn reset_bytes(&self) -> Bytes {
        Bytes::from_static(&[0x00; REPORT_LEN])
    }
}

/// Command for one of the supported models.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum Command {
    Lr6(Lr6Config),
    Ne(NeConfig),
}

impl Command {
    /// Model this command was built for.
    pub fn model_name(&self) -> &'static str {
        self.model().controller().model_name()
    }

    pub fn model(&self) -> DeviceModel {
        match self {
            Self::Lr6(_) => DeviceModel::Lr6,
            Self::Ne(_) => DeviceModel::Ne,
        }
    }
}

/// Supported signal tower models.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum DeviceModel {
    Lr6,
    Ne,
}

impl DeviceModel {
    /// Get the controller for a model.
    pub(crate) fn controller(&self) -> Box<dyn SignalTower> {
        match self {
            Self::Lr6 => Box::new(Lr6Usb),
            Self::Ne => Box::new(NeUsb),
        }
    }
}

/// USB identity of a HID device.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub struct DeviceId {
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceId {
    pub fn new(vendor_id: u16, product_id: u16) -> Self {
        Self { vendor_id, product_id }
    }

    /// Check if the device passes the connection filter.
    pub fn is_allowed(&self) -> bool {
        self.vendor_id == VENDOR_ID && PRODUCT_IDS.contains(&self.product_id)
    }
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// Controller selected for the connected device.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum Selection {
    Unconnected,
    Lr6,
    Ne,
    Unsupported(DeviceId),
}

impl Selection {
    /// Get the controller for the selected device.
    pub(crate) fn controller(&self) -> Result<Box<dyn SignalTower>> {
        match self {
            Self::Unconnected => Err(Error::DeviceUnavailable),
            Self::Lr6 => Ok(DeviceModel::Lr6.controller()),
            Self::Ne => Ok(DeviceModel::Ne.controller()),
            Self::Unsupported(id) => Err(Error::UnsupportedDevice(*id)),
        }
    }
}

impl Display for Selection {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconnected => write!(f, "not connected"),
            Self::Lr6 => write!(f, "{}", DeviceModel::Lr6.controller().model_name()),
            Self::Ne => write!(f, "{}", DeviceModel::Ne.controller().model_name()),
            Self::Unsupported(_) => write!(f, "not supported"),
        }
    }
}

/// Pick the controller for a connected device.
pub fn select(device: Option<DeviceId>) -> Selection {
    let selection = match device {
        None => Selection::Unconnected,
        Some(id) if id.vendor_id != VENDOR_ID => Selection::Unsupported(id),
        Some(id) => match id.product_id {
            ne_usb::PRODUCT_ID => Selection::Ne,
            lr6_usb::PRODUCT_ID => Selection::Lr6,
            _ => Selection::Unsupported(id),
        },
    };

    debug!(?device, ?selection, "Selected controller");

    selection
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_device_is_unconnected() {
        assert_eq!(select(None), Selection::Unconnected);
    }

    #[test]
    fn product_ids_select_models() {
        assert_eq!(select(Some(DeviceId::new(VENDOR_ID, 0x6001))), Selection::Ne);
        assert_eq!(select(Some(DeviceId::new(VENDOR_ID, 0x8003))), Selection::Lr6);
    }

    #[test]
    fn unknown_product_is_unsupported() {
        let id = DeviceId::new(VENDOR_ID, 0x1234);
        assert_eq!(select(Some(id)), Selection::Unsupported(id));
    }

    #[test]
    fn foreign_vendor_is_unsupported() {
        let id = DeviceId::new(0x048d, 0x8003);
        assert_eq!(select(Some(id)), Selection::Unsupported(id));
    }

    #[test]
    fn selected_controllers_match_product_ids() {
        for &product_id in PRODUCT_IDS.iter() {
            let controller = select(Some(DeviceId::new(VENDOR_ID, product_id))).controller().unwrap();
            assert_eq!(controller.vendor_id(), VENDOR_ID);
            assert_eq!(controller.product_id(), product_id);
        }
    }

    #[test]
    fn unusable_selections_have_no_controller() {
        assert!(matches!(Selection::Unconnected.controller(), Err(Error::DeviceUnavailable)));

        let id = DeviceId::new(VENDOR_ID, 0x1234);
        assert!(matches!(Selection::Unsupported(id).controller(), Err(Error::UnsupportedDevice(_))));
    }

    #[test]
    fn connection_filter() {
        assert!(DeviceId::new(0x191a, 0x6001).is_allowed());
        assert!(DeviceId::new(0x191a, 0x8003).is_allowed());
        assert!(!DeviceId::new(0x191a, 0x1234).is_allowed());
        assert!(!DeviceId::new(0x0b05, 0x6001).is_allowed());
    }

    #[test]
    fn command_model_names() {
        assert_eq!(Command::Lr6(Lr6Config::default()).model_name(), "LR6-USB");
        assert_eq!(Command::Ne(NeConfig::default()).model_name(), "NE-USB");
    }

    #[test]
    fn device_id_display() {
        assert_eq!(DeviceId::new(0x191a, 0x6001).to_string(), "191a:6001");
    }
}
