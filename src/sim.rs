//! Simulated NOR flash behind GPIO ports
//!
//! Models the port registers (direction, output) and a chip wired as
//! described by a `BusGeometry`. The chip only drives the data bus while
//! CE# and OE# are low, WE# and RESET# are high; in byte mode (BYTE# low) it
//! returns the byte at `address` of the little-endian word array, in word
//! mode the word at `address`. Reads past the array return erased data.
//!
//! Input pins without a driver read as high (pull-ups).

use std::time::Duration;

use crate::gpio::{
	Gpio,
	Port,
};
use crate::nor::{
	BusGeometry,
	ControlLine,
};

const PORT_COUNT: usize = 256;

pub struct SimulatedFlash {
	geometry: BusGeometry,
	words: Vec<u16>,
	direction: Vec<u8>,
	output: Vec<u8>,
	sampled: Vec<u64>,
	calls: usize,
	reset_pulses: usize,
	write_enable_seen: bool,
}

impl SimulatedFlash {
	pub fn from_words(geometry: BusGeometry, words: Vec<u16>) -> Self {
		SimulatedFlash {
			geometry,
			words,
			direction: vec![0; PORT_COUNT],
			output: vec![0; PORT_COUNT],
			sampled: Vec::new(),
			calls: 0,
			reset_pulses: 0,
			write_enable_seen: false,
		}
	}

	/// byte image as it would be read in byte mode
	pub fn from_bytes(geometry: BusGeometry, image: &[u8]) -> Self {
		let words = image.chunks(2).map(|chunk| {
			let low = chunk[0] as u16;
			let high = chunk.get(1).cloned().unwrap_or(0xff) as u16;
			low | high << 8
		}).collect();
		Self::from_words(geometry, words)
	}

	pub fn direction(&self, port: Port) -> u8 {
		self.direction[port.0 as usize]
	}

	pub fn output(&self, port: Port) -> u8 {
		self.output[port.0 as usize]
	}

	/// (direction, output) of all ports
	pub fn registers(&self) -> (Vec<u8>, Vec<u8>) {
		(self.direction.clone(), self.output.clone())
	}

	/// addresses the chip put on the data bus for, in order
	pub fn sampled(&self) -> &[u64] {
		&self.sampled
	}

	/// number of `Gpio` calls so far (delays included)
	pub fn calls(&self) -> usize {
		self.calls
	}

	pub fn reset_pulses(&self) -> usize {
		self.reset_pulses
	}

	/// whether WE# was ever driven low
	pub fn write_enable_seen(&self) -> bool {
		self.write_enable_seen
	}

	fn pin_level(&self, port: Port, mask: u8) -> bool {
		let direction = self.direction(port);
		0 == direction & mask || 0 != self.output(port) & mask
	}

	/// level of a control line as the chip sees it (undriven lines float high)
	pub fn line_high(&self, line: ControlLine) -> bool {
		self.pin_level(self.geometry.control, line.mask())
	}

	fn driving(&self) -> bool {
		!self.line_high(ControlLine::ChipEnable)
		&& !self.line_high(ControlLine::OutputEnable)
		&& self.line_high(ControlLine::WriteEnable)
		&& self.line_high(ControlLine::Reset)
	}

	fn address(&self) -> u64 {
		let address = self.geometry.address.iter().enumerate().fold(0u64, |address, (i, &port)| {
			let lines = self.output(port) & self.direction(port);
			address | (lines as u64) << (8 * i)
		});
		address & self.geometry.address_mask()
	}

	fn word_at(&self, index: u64) -> u16 {
		if index >= self.words.len() as u64 {
			return 0xffff;
		}
		self.words[index as usize]
	}

	fn chip_data(&self, port: Port) -> u8 {
		let address = self.address();
		let word_mode = self.line_high(ControlLine::WidthSelect);
		if word_mode {
			let word = self.word_at(address);
			if port == self.geometry.data[0] {
				word as u8
			} else {
				(word >> 8) as u8
			}
		} else if port == self.geometry.data[0] {
			let word = self.word_at(address >> 1);
			(word >> (8 * (address & 1))) as u8
		} else {
			// DQ8..DQ14 tri-stated in byte mode
			0xff
		}
	}

	fn update_control(&mut self, update: impl FnOnce(&mut Self)) {
		let was_in_reset = !self.line_high(ControlLine::Reset);
		update(self);
		if was_in_reset && self.line_high(ControlLine::Reset) {
			self.reset_pulses += 1;
		}
		if !self.line_high(ControlLine::WriteEnable) {
			self.write_enable_seen = true;
		}
	}
}

impl Gpio for SimulatedFlash {
	fn set_direction(&mut self, port: Port, outputs: u8) {
		self.calls += 1;
		self.update_control(|sim| sim.direction[port.0 as usize] = outputs);
	}

	fn write(&mut self, port: Port, value: u8) {
		self.calls += 1;
		self.update_control(|sim| sim.output[port.0 as usize] = value);
	}

	fn read(&mut self, port: Port) -> u8 {
		self.calls += 1;
		let direction = self.direction(port);
		let driven = self.output(port) & direction;
		let is_data = self.geometry.data.contains(&port);

		if is_data && self.driving() {
			if port == self.geometry.data[0] {
				let address = self.address();
				self.sampled.push(address);
			}
			driven | (self.chip_data(port) & !direction)
		} else {
			driven | !direction
		}
	}

	fn delay(&mut self, _duration: Duration) {
		self.calls += 1;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const GEOMETRY: BusGeometry = BusGeometry::DEFAULT;

	fn select(sim: &mut SimulatedFlash, address: u64, word_mode: bool) {
		for (i, &port) in GEOMETRY.address.iter().enumerate() {
			sim.set_direction(port, 0xff);
			sim.write(port, (address >> (8 * i)) as u8);
		}
		let width = if word_mode { ControlLine::WidthSelect.mask() } else { 0 };
		// CE#, OE# low; WE#, RESET# high
		sim.write(GEOMETRY.control, ControlLine::WriteEnable.mask() | ControlLine::Reset.mask() | width);
		sim.set_direction(GEOMETRY.control, 0x3f);
	}

	#[test]
	fn floating_until_selected() {
		let mut sim = SimulatedFlash::from_words(GEOMETRY, vec![0x1234]);
		assert_eq!(sim.read(GEOMETRY.data[0]), 0xff);
		assert!(sim.sampled().is_empty());
		assert_eq!(sim.calls(), 1);
	}

	#[test]
	fn byte_and_word_reads() {
		let mut sim = SimulatedFlash::from_words(GEOMETRY, vec![0x1234, 0x5678]);
		select(&mut sim, 1, true);
		assert_eq!(sim.read(GEOMETRY.data[0]), 0x78);
		assert_eq!(sim.read(GEOMETRY.data[1]), 0x56);

		select(&mut sim, 1, false);
		assert_eq!(sim.read(GEOMETRY.data[0]), 0x12);
		select(&mut sim, 2, false);
		assert_eq!(sim.read(GEOMETRY.data[0]), 0x78);

		select(&mut sim, 7, false);
		assert_eq!(sim.read(GEOMETRY.data[0]), 0xff);

		assert_eq!(sim.sampled(), &[1, 1, 2, 7]);
	}

	#[test]
	fn reset_pulse_and_write_enable_tracking() {
		let mut sim = SimulatedFlash::from_bytes(GEOMETRY, &[]);
		sim.set_direction(GEOMETRY.control, 0x3f);
		// everything low: RESET# and WE# asserted
		assert!(sim.write_enable_seen());
		sim.write(GEOMETRY.control, ControlLine::Reset.mask());
		assert_eq!(sim.reset_pulses(), 1);
	}
}
