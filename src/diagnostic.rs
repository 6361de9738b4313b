//! # Connection Test Page
//!
//! A short text-only printout that proves the link works end to end:
//! reset, a centered double-size header, a few status lines, feed, cut.
//! No raster is sent, so it also works when the printer is low on buffer.

use crate::error::PressplotError;
use crate::printer::PrinterDriver;
use crate::protocol::commands::Alignment;
use crate::transport::Transport;

/// Width of the separator rule in characters (Font A on 80 mm paper)
pub const RULE_WIDTH: usize = 42;

/// Lines fed before the cut
const TEST_FEED_LINES: u8 = 3;

/// Contents of the connection test page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestPage {
    /// Printed as the header, usually the printer model
    pub header: String,
    /// Already formatted date and time
    pub timestamp: String,
}

impl TestPage {
    pub fn new(header: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Initialize the printer and print the page.
    ///
    /// ## Errors
    ///
    /// [`PressplotError::Init`] if the printer does not accept the reset.
    /// Text lines are best effort once the printer is initialized.
    pub fn print<T: Transport>(&self, driver: &mut PrinterDriver<T>) -> Result<(), PressplotError> {
        driver.initialize()?;

        driver.set_alignment(Alignment::Center);
        driver.set_font_size(2, 2);
        driver.print_text(&self.header);
        driver.set_font_size(1, 1);
        driver.print_text("Connection Test");
        driver.set_alignment(Alignment::Left);
        driver.print_text("");

        driver.print_text(&format!("Date: {}", self.timestamp));
        driver.print_text("Status: OPERATIONAL");
        driver.print_text("");
        driver.print_text("All tests passed!");
        driver.print_text(&"-".repeat(RULE_WIDTH));

        driver.feed(TEST_FEED_LINES);
        driver.cut();

        log::info!("Test page sent to {}", driver.config().name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::{PrinterConfig, Timing};
    use crate::protocol::commands::{ESC, GS};
    use crate::transport::MockTransport;
    use pretty_assertions::assert_eq;

    fn driver(transport: MockTransport) -> PrinterDriver<MockTransport> {
        PrinterDriver::new(transport, PrinterConfig::TM_T88III, Timing::immediate())
    }

    #[test]
    fn test_page_byte_sequence() {
        let mut d = driver(MockTransport::new());
        TestPage::new("EPSON TM-T88III", "2024-05-01 10:00:00")
            .print(&mut d)
            .unwrap();

        let expected: Vec<Vec<u8>> = vec![
            vec![ESC, b'@'],
            vec![ESC, b'@'],
            vec![ESC, b'a', 1],
            vec![GS, b'!', 0x11],
            b"EPSON TM-T88III\n".to_vec(),
            vec![GS, b'!', 0x00],
            b"Connection Test\n".to_vec(),
            vec![ESC, b'a', 0],
            b"\n".to_vec(),
            b"Date: 2024-05-01 10:00:00\n".to_vec(),
            b"Status: OPERATIONAL\n".to_vec(),
            b"\n".to_vec(),
            b"All tests passed!\n".to_vec(),
            [vec![b'-'; RULE_WIDTH], vec![b'\n']].concat(),
            vec![ESC, b'd', 3],
            vec![GS, b'V', 0],
        ];
        assert_eq!(d.transport().writes(), expected.as_slice());
    }

    #[test]
    fn test_page_stops_when_init_fails() {
        let mut d = driver(MockTransport::with_write_limit(1));
        let result = TestPage::new("X", "now").print(&mut d);

        assert!(matches!(result, Err(PressplotError::Init(_))));
        assert_eq!(d.transport().writes().len(), 1);
    }
}
