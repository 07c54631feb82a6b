use std::iter::FusedIterator;

use crate::cancel::CancelFlag;
use crate::gpio::Gpio;
use crate::nor::{
	Bus,
	TransferMode,
};

use super::{
	DumpTarget,
	Endianness,
	Outcome,
	word_bytes,
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum State {
	Running,
	Finished(Outcome),
}

/// A single pass over the flash, yielding the dumped bytes
///
/// Every address in `0..length` is read exactly once, in increasing order;
/// word mode yields two bytes per address. The cancel flag is checked
/// before each address, so a started read cycle is always completed and its
/// bytes are still yielded.
///
/// Once finished (or cancelled) the session stays finished.
pub struct DumpSession<'c, G: Gpio> {
	bus: Bus<G>,
	cancel: &'c CancelFlag,
	endianness: Endianness,
	mode: TransferMode,
	length: u64,
	cursor: u64,
	pending: Option<u8>,
	state: State,
}

impl<'c, G: Gpio> DumpSession<'c, G> {
	/// Clears the cancel flag, takes over the bus and resets the flash.
	///
	/// Nothing is touched if `target` doesn't fit its geometry.
	pub fn start(gpio: G, target: &DumpTarget, endianness: Endianness, mode: TransferMode, cancel: &'c CancelFlag) -> crate::AResult<Self> {
		target.validate()?;

		// a cancel request for a previous dump must not stop this one
		cancel.clear();
		cancel.arm();

		debug!("starting NOR dump of 0x{:x} addresses ({:?}, {:?})", target.length, mode, endianness);
		let mut bus = Bus::init(gpio, target.geometry);
		bus.reset_flash();

		Ok(DumpSession {
			bus,
			cancel,
			endianness,
			mode,
			length: target.length,
			cursor: 0,
			pending: None,
			state: State::Running,
		})
	}

	/// `None` while still running
	pub fn outcome(&self) -> Option<Outcome> {
		match self.state {
			State::Running => None,
			State::Finished(outcome) => Some(outcome),
		}
	}

	fn finish(&mut self, outcome: Outcome) {
		self.bus.release();
		self.cancel.disarm();
		match outcome {
			Outcome::Completed { addresses } => {
				debug!("NOR dump complete after 0x{:x} addresses", addresses);
			},
			Outcome::Cancelled { addresses } => {
				warn!("NOR dump cancelled after 0x{:x} of 0x{:x} addresses", addresses, self.length);
			},
		}
		self.state = State::Finished(outcome);
	}
}

impl<'c, G: Gpio> Drop for DumpSession<'c, G> {
	fn drop(&mut self) {
		if State::Running == self.state {
			debug!("NOR dump abandoned after 0x{:x} addresses", self.cursor);
			self.bus.release();
			self.cancel.disarm();
		}
	}
}

impl<'c, G: Gpio> Iterator for DumpSession<'c, G> {
	type Item = u8;

	fn next(&mut self) -> Option<Self::Item> {
		if let Some(data) = self.pending.take() {
			return Some(data);
		}
		if State::Running != self.state {
			return None;
		}
		if self.cursor >= self.length {
			let addresses = self.cursor;
			self.finish(Outcome::Completed { addresses });
			return None;
		}
		if self.cancel.is_cancelled() {
			let addresses = self.cursor;
			self.finish(Outcome::Cancelled { addresses });
			return None;
		}

		let address = self.cursor;
		self.cursor += 1;

		self.bus.select_mode(self.mode);
		let data = self.bus.read_cycle(address, self.mode);
		match self.mode {
			TransferMode::Byte => Some(data as u8),
			TransferMode::Word => {
				let [first, second] = word_bytes(data, self.endianness);
				self.pending = Some(second);
				Some(first)
			},
		}
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let pending = self.pending.is_some() as u64;
		let remaining = match self.state {
			State::Running => (self.length - self.cursor).saturating_mul(self.mode.bytes_per_address()),
			State::Finished(_) => 0,
		};
		// cancellation can always cut it short
		let upper = remaining.saturating_add(pending);
		if upper > usize::max_value() as u64 {
			(pending as usize, None)
		} else {
			(pending as usize, Some(upper as usize))
		}
	}
}

impl<'c, G: Gpio> FusedIterator for DumpSession<'c, G> {}
