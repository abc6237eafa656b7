//! HID report transport.

use hidapi::{HidApi, HidDevice};
use tracing::{debug, info, warn};

use crate::controller::DeviceId;
use crate::error::{Error, Result};

/// Output report sink.
pub(crate) trait Transport {
    /// Send a single output report.
    ///
    /// The report is written in one piece, it is never partially sent.
    fn send_report(&mut self, report_id: u8, data: &[u8]) -> Result<()>;

    /// Release the device, all further sends will fail.
    fn close(&mut self) -> Result<()>;
}

/// Transport backed by a hidapi device handle.
pub(crate) struct HidTransport {
    id: DeviceId,
    device: Option<HidDevice>,
}

impl HidTransport {
    /// Open the first signal tower accepted by the connection filter.
    ///
    /// Returns `None` if no matching device is attached or it could not be
    /// opened.
    pub fn connect(api: &HidApi) -> Option<Self> {
        let info = api
            .device_list()
            .find(|info| DeviceId::new(info.vendor_id(), info.product_id()).is_allowed())?;
        let id = DeviceId::new(info.vendor_id(), info.product_id());

        match info.open_device(api) {
            Ok(device) => {
                info!(%id, "Connected signal tower");
                Some(Self { id, device: Some(device) })
            },
            Err(err) => {
                warn!(%id, "Unable to open device: {err} (root permissions required)");
                None
            },
        }
    }

    pub fn device_id(&self) -> DeviceId {
        self.id
    }
}

impl Transport for HidTransport {
    fn send_report(&mut self, report_id: u8, data: &[u8]) -> Result<()> {
        let device = self.device.as_ref().ok_or(Error::DeviceUnavailable)?;

        // hidapi expects the report ID as first byte.
        let mut report = Vec::with_capacity(data.len() + 1);
        report.push(report_id);
        report.extend_from_slice(data);

        let written = device.write(&report)?;
        debug!(id = %self.id, written, "Sent report {:02x?}", data);

        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.device.take().is_some() {
            info!(id = %self.id, "Closed signal tower");
        }

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;

    #[test]
    fn closed_transport_rejects_reports() {
        let mut transport = HidTransport { id: DeviceId::new(0x191a, 0x6001), device: None };
        let err = transport.send_report(0, &[0x00; 8]).unwrap_err();
        assert!(matches!(err, Error::DeviceUnavailable));

        // Closing twice is fine.
        assert!(transport.close().is_ok());
        assert!(transport.close().is_ok());
    }

    #[test]
    fn mock_send_after_close_fails() {
        let mut transport = MockTransport::default();
        transport.send_report(0, &[0x01; 8]).unwrap();
        transport.close().unwrap();

        let err = transport.send_report(0, &[0x02; 8]).unwrap_err();
        assert!(matches!(err, Error::DeviceUnavailable));
        assert_eq!(transport.reports, vec![(0, vec![0x01; 8])]);
    }
}
