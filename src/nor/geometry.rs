use crate::gpio::Port;

/// Direction a line needs to be configured with
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	Input,
	Output,
}

/// Lines on the control port
///
/// ```text
/// bit 0: CE#        output
/// bit 1: OE#        output
/// bit 2: WE#        output
/// bit 3: WP#/ACC    output
/// bit 4: RESET#     output
/// bit 5: BYTE#      output
/// bit 6: RY/BY#     input
/// bit 7: not connected, input
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum ControlLine {
	ChipEnable,
	OutputEnable,
	WriteEnable,
	WriteProtect,
	Reset,
	WidthSelect,
	ReadyBusy,
}

pub const NOT_CONNECTED: u8 = 0x80;

impl ControlLine {
	pub const ALL: [ControlLine; 7] = [
		ControlLine::ChipEnable,
		ControlLine::OutputEnable,
		ControlLine::WriteEnable,
		ControlLine::WriteProtect,
		ControlLine::Reset,
		ControlLine::WidthSelect,
		ControlLine::ReadyBusy,
	];

	pub fn mask(self) -> u8 {
		match self {
			ControlLine::ChipEnable => 0x01,
			ControlLine::OutputEnable => 0x02,
			ControlLine::WriteEnable => 0x04,
			ControlLine::WriteProtect => 0x08,
			ControlLine::Reset => 0x10,
			ControlLine::WidthSelect => 0x20,
			ControlLine::ReadyBusy => 0x40,
		}
	}

	pub fn direction(self) -> Direction {
		match self {
			ControlLine::ReadyBusy => Direction::Input,
			_ => Direction::Output,
		}
	}

	// all but BYTE# (high: word mode) are asserted by pulling them low
	pub fn active_low(self) -> bool {
		self != ControlLine::WidthSelect
	}
}

/// direction register value for the control port
pub fn control_outputs() -> u8 {
	ControlLine::ALL.iter()
		.filter(|line| line.direction() == Direction::Output)
		.fold(0, |mask, line| mask | line.mask())
}

/// Control port value while idle: chip, outputs, writes and reset
/// deasserted, write protection on, byte mode.
pub fn control_idle() -> u8 {
	ControlLine::ChipEnable.mask()
	| ControlLine::OutputEnable.mask()
	| ControlLine::WriteEnable.mask()
	| ControlLine::Reset.mask()
}

/// Which ports the flash is wired to
///
/// Address port `i` carries address bits `8*i .. 8*i+7`, data port `i` data
/// bits `8*i .. 8*i+7`. Only the lowest `address_lines` address bits are
/// connected.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct BusGeometry {
	pub control: Port,
	pub address: [Port; 4],
	pub data: [Port; 2],
	pub address_lines: u32,
}

pub const MAX_ADDRESS_LINES: u32 = 32;

impl BusGeometry {
	/// PORTA..PORTD address, PORTE/PORTF data, PORTK control
	pub const DEFAULT: BusGeometry = BusGeometry {
		control: Port(9),
		address: [Port(0), Port(1), Port(2), Port(3)],
		data: [Port(4), Port(5)],
		address_lines: MAX_ADDRESS_LINES,
	};

	pub fn address_mask(&self) -> u64 {
		(1u64 << self.address_lines.min(MAX_ADDRESS_LINES)) - 1
	}

	/// number of distinct addresses the connected lines can reach
	pub fn address_limit(&self) -> u64 {
		self.address_mask() + 1
	}

	pub fn ports(&self) -> Vec<Port> {
		let mut ports = vec![self.control];
		ports.extend_from_slice(&self.address);
		ports.extend_from_slice(&self.data);
		ports
	}

	pub fn validate(&self) -> crate::AResult<()> {
		ensure!(self.address_lines >= 1 && self.address_lines <= MAX_ADDRESS_LINES,
			"address line count must be within 1..={}, got {}", MAX_ADDRESS_LINES, self.address_lines
		);
		let mut ports = self.ports();
		ports.sort();
		for pair in ports.windows(2) {
			ensure!(pair[0] != pair[1], "{} used for more than one bus", pair[0]);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn control_directions() {
		// everything but RY/BY# and the unconnected pin is driven
		assert_eq!(control_outputs(), 0x3f);
		assert_eq!(control_outputs() & (ControlLine::ReadyBusy.mask() | NOT_CONNECTED), 0);
	}

	#[test]
	fn idle_control_never_writes() {
		let idle = control_idle();
		assert_ne!(idle & ControlLine::WriteEnable.mask(), 0);
		assert_ne!(idle & ControlLine::ChipEnable.mask(), 0);
		assert_ne!(idle & ControlLine::OutputEnable.mask(), 0);
		assert_ne!(idle & ControlLine::Reset.mask(), 0);
		assert_eq!(idle & ControlLine::WriteProtect.mask(), 0);
	}

	#[test]
	fn line_masks_are_distinct() {
		let all = ControlLine::ALL.iter().fold(0u8, |acc, line| {
			assert_eq!(acc & line.mask(), 0, "{:?} overlaps", line);
			acc | line.mask()
		});
		assert_eq!(all | NOT_CONNECTED, 0xff);
	}

	#[test]
	fn address_mask() {
		assert_eq!(BusGeometry::DEFAULT.address_mask(), 0xffff_ffff);
		let geometry = BusGeometry { address_lines: 22, ..BusGeometry::DEFAULT };
		assert_eq!(geometry.address_mask(), 0x3f_ffff);
		assert_eq!(geometry.address_limit(), 0x40_0000);
	}

	#[test]
	fn validate() {
		BusGeometry::DEFAULT.validate().unwrap();

		let overlapping = BusGeometry { data: [Port(4), Port(3)], ..BusGeometry::DEFAULT };
		assert!(overlapping.validate().is_err());

		let no_lines = BusGeometry { address_lines: 0, ..BusGeometry::DEFAULT };
		assert!(no_lines.validate().is_err());

		let too_many = BusGeometry { address_lines: 33, ..BusGeometry::DEFAULT };
		assert!(too_many.validate().is_err());
	}
}
