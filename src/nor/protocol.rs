use std::time::Duration;

use crate::gpio::Gpio;

use super::geometry::{
	BusGeometry,
	ControlLine,
	control_idle,
	control_outputs,
};

// RESET# low pulse width (tRP)
const RESET_PULSE: Duration = Duration::from_micros(1);
// RESET# high until the chip accepts reads, even if the reset interrupted an
// embedded algorithm (tREADY)
const RESET_READY: Duration = Duration::from_micros(20);
// address / OE# to valid output data (covers tACC and tOE)
const ACCESS_TIME: Duration = Duration::from_nanos(120);

/// Width of a single read cycle
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum TransferMode {
	/// 8 data lines, one byte per address
	Byte,
	/// 16 data lines, one word per address
	Word,
}

impl TransferMode {
	/// `0` selects byte mode, everything else word mode
	pub fn from_selector(selector: u32) -> Self {
		if 0 == selector {
			TransferMode::Byte
		} else {
			TransferMode::Word
		}
	}

	pub fn bytes_per_address(self) -> u64 {
		match self {
			TransferMode::Byte => 1,
			TransferMode::Word => 2,
		}
	}
}

/// Exclusive access to the flash bus
///
/// Keeps a shadow of the control port, all control changes write the full
/// port value.
pub struct Bus<G: Gpio> {
	gpio: G,
	geometry: BusGeometry,
	control: u8,
}

impl<G: Gpio> Bus<G> {
	/// Configure all pins for reading: control lines idle and driven (but
	/// RY/BY#), address lines driven, data lines floating.
	pub fn init(mut gpio: G, geometry: BusGeometry) -> Self {
		debug!("initializing NOR bus {:?}", geometry);
		let control = control_idle();
		gpio.write(geometry.control, control);
		gpio.set_direction(geometry.control, control_outputs());

		for &port in geometry.address.iter() {
			gpio.set_direction(port, 0xff);
		}

		// clear output registers first so no pull-ups are left enabled
		for &port in geometry.data.iter() {
			gpio.write(port, 0x00);
		}
		for &port in geometry.data.iter() {
			gpio.set_direction(port, 0x00);
		}

		Bus {
			gpio,
			geometry,
			control,
		}
	}

	fn set_line(&mut self, line: ControlLine, high: bool) {
		if high {
			self.control |= line.mask();
		} else {
			self.control &= !line.mask();
		}
		self.gpio.write(self.geometry.control, self.control);
	}

	fn assert_line(&mut self, line: ControlLine) {
		let high = !line.active_low();
		self.set_line(line, high);
	}

	fn deassert_line(&mut self, line: ControlLine) {
		let high = line.active_low();
		self.set_line(line, high);
	}

	pub fn reset_flash(&mut self) {
		self.assert_line(ControlLine::Reset);
		self.gpio.delay(RESET_PULSE);
		self.deassert_line(ControlLine::Reset);
		self.gpio.delay(RESET_READY);
	}

	pub fn select_mode(&mut self, mode: TransferMode) {
		match mode {
			TransferMode::Byte => self.deassert_line(ControlLine::WidthSelect),
			TransferMode::Word => self.assert_line(ControlLine::WidthSelect),
		}
	}

	fn drive_address(&mut self, address: u64) {
		let address = address & self.geometry.address_mask();
		for (i, &port) in self.geometry.address.iter().enumerate() {
			self.gpio.write(port, (address >> (8 * i)) as u8);
		}
	}

	/// Drive `address` and enable the chip outputs; the returned cycle
	/// disables the outputs again when dropped.
	///
	/// CE# stays asserted after the cycle.
	pub fn start_read(&mut self, address: u64) -> ReadCycle<G> {
		self.drive_address(address);
		self.assert_line(ControlLine::ChipEnable);
		self.assert_line(ControlLine::OutputEnable);
		self.gpio.delay(ACCESS_TIME);
		ReadCycle(self)
	}

	/// one complete read cycle; byte reads are returned in the low 8 bits
	pub fn read_cycle(&mut self, address: u64, mode: TransferMode) -> u16 {
		let data = self.start_read(address).sample(mode);
		trace!("read {:?} at 0x{:x}: 0x{:04x}", mode, address, data);
		data
	}

	/// put the chip back into standby
	pub fn release(&mut self) {
		self.deassert_line(ControlLine::OutputEnable);
		self.deassert_line(ControlLine::ChipEnable);
	}
}

/// Chip is selected and driving the data bus
pub struct ReadCycle<'a, G: Gpio + 'a>(&'a mut Bus<G>);

impl<'a, G: Gpio> ReadCycle<'a, G> {
	pub fn sample(self, mode: TransferMode) -> u16 {
		let data = self.0.geometry.data;
		let low = self.0.gpio.read(data[0]) as u16;
		match mode {
			TransferMode::Byte => low,
			TransferMode::Word => low | (self.0.gpio.read(data[1]) as u16) << 8,
		}
	}
}

impl<'a, G: Gpio> Drop for ReadCycle<'a, G> {
	fn drop(&mut self) {
		self.0.deassert_line(ControlLine::OutputEnable);
	}
}
