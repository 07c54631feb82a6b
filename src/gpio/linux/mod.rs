/* AVR XMEGA style port registers, one block per port */

mod mapped;

use self::mapped::Mapped;

use super::{
	Gpio,
	Port,
};

pub const PORT_STRIDE: usize = 0x20;
// room for ports 0..=15
pub const PORT_WINDOW_LEN: usize = 16 * PORT_STRIDE;

const PORT_DIR: usize = 0x00;
const PORT_OUT: usize = 0x04;
const PORT_IN: usize = 0x08;

struct PortWindow {
	mapped: Mapped,
}

impl PortWindow {
	fn register(&self, port: Port, register: usize) -> usize {
		let offset = port.0 as usize * PORT_STRIDE + register;
		assert!(offset < self.mapped.len(), "{} outside of mapped port window", port);
		offset
	}
}

impl Gpio for PortWindow {
	fn set_direction(&mut self, port: Port, outputs: u8) {
		let offset = self.register(port, PORT_DIR);
		self.mapped.write_byte(offset, outputs);
	}

	fn write(&mut self, port: Port, value: u8) {
		let offset = self.register(port, PORT_OUT);
		self.mapped.write_byte(offset, value);
	}

	fn read(&mut self, port: Port) -> u8 {
		let offset = self.register(port, PORT_IN);
		self.mapped.read_byte(offset)
	}
}

/// Map the port register window found at `offset` in `path` (`/dev/mem`, a
/// UIO device, ...); port `n` is expected at `offset + n * PORT_STRIDE`.
pub fn open_port_window(path: &str, offset: u64) -> crate::AResult<impl Gpio> {
	with_context!(("failed to map GPIO ports from {} at 0x{:x}", path, offset), {
		let mapped = mapped::inner_open(path, offset, PORT_WINDOW_LEN)?;
		debug!("mapped {} bytes of GPIO registers from {} at 0x{:x}", mapped.len(), path, offset);
		Ok(PortWindow { mapped })
	})
}
