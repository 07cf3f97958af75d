use std::io::Write;

/// Completed lines are logged at the latest when they reach this length.
const MAX_LINE_LENGTH: usize = 256;

/// Debug sink for the serial port. Test ROMs start a transfer with the internal
/// clock and use the transmitted bytes as a text output channel.
pub struct SerialTransfer {
    print: bool,
    collect: bool,
    line: Vec<u8>,
    output: Vec<u8>,
}

impl SerialTransfer {
    /// Value written to SC to start a transfer using the internal clock.
    pub const START_INTERNAL_CLOCK: u8 = 0x81;

    /// Creates a new sink, transferred bytes are only kept if `collect` is set.
    pub fn new(print: bool, collect: bool) -> Self {
        Self {
            print,
            collect,
            line: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Emits a transferred byte, completed lines are logged.
    pub fn transfer(&mut self, data: u8) {
        if self.collect {
            self.output.push(data);
        }
        if self.print {
            let mut stdout = std::io::stdout();
            stdout.write_all(&[data]).ok();
            stdout.flush().ok();
        }

        if data != b'\n' {
            self.line.push(data);
        }
        if data == b'\n' || self.line.len() >= MAX_LINE_LENGTH {
            log::info!("Serial: {}", String::from_utf8_lossy(&self.line));
            self.line.clear();
        }
    }

    /// Returns everything transferred so far.
    #[inline]
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_collection() {
        let mut serial = SerialTransfer::new(false, true);
        serial.transfer(b'o');
        serial.transfer(b'k');
        assert_eq!(serial.output(), b"ok");
        assert_eq!(serial.line, b"ok");

        let mut serial = SerialTransfer::new(false, false);
        serial.transfer(b'o');
        assert!(serial.output().is_empty(), "Output is only kept when collecting");
    }

    #[test]
    fn test_line_is_bounded() {
        let mut serial = SerialTransfer::new(false, false);
        for _ in 0..MAX_LINE_LENGTH * 3 + 1 {
            serial.transfer(b'x');
        }
        assert_eq!(serial.line.len(), 1);

        serial.transfer(b'\n');
        assert!(serial.line.is_empty());
    }
}
