use crate::cancel::CancelFlag;
use crate::gpio::Gpio;
use crate::nor::BusGeometry;

pub use crate::nor::TransferMode;

mod session;
mod sink;

pub use self::session::DumpSession;
pub use self::sink::DumpSink;

pub const DEFAULT_LENGTH: u64 = 0x80_0000;

/// Order in which the two bytes of a word are emitted
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Endianness {
	/// high byte first
	LittleEndian,
	/// low byte first
	BigEndian,
}

impl Endianness {
	/// `0`: little endian, `1`: big endian
	pub fn from_selector(selector: u32) -> Option<Self> {
		match selector {
			0 => Some(Endianness::LittleEndian),
			1 => Some(Endianness::BigEndian),
			_ => None,
		}
	}
}

/// Split a word read into the two bytes to emit, in emission order.
///
/// The naming follows how the chip's words end up in the disassembly of a
/// dump: `BigEndian` emits bits 7..0 before bits 15..8, `LittleEndian` the
/// other way round. Recovery tooling relies on exactly this pairing.
pub fn word_bytes(word: u16, endianness: Endianness) -> [u8; 2] {
	let high = (word >> 8) as u8;
	let low = word as u8;
	match endianness {
		Endianness::BigEndian => [low, high],
		Endianness::LittleEndian => [high, low],
	}
}

/// Flash chip to dump: how it is wired and how many addresses it has.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct DumpTarget {
	pub geometry: BusGeometry,
	/// number of addresses; in word mode each address holds two bytes
	pub length: u64,
}

impl Default for DumpTarget {
	fn default() -> Self {
		DumpTarget {
			geometry: BusGeometry::DEFAULT,
			length: DEFAULT_LENGTH,
		}
	}
}

impl DumpTarget {
	pub fn validate(&self) -> crate::AResult<()> {
		self.geometry.validate()?;
		ensure!(self.length <= self.geometry.address_limit(),
			"length 0x{:x} can't be reached with {} address lines", self.length, self.geometry.address_lines
		);
		Ok(())
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Outcome {
	Completed { addresses: u64 },
	Cancelled { addresses: u64 },
}

/// Dump the whole flash into `sink`.
///
/// The sink sees `start` after the flash was reset, then every byte, then
/// `end`; also after a cancellation. If the sink fails the chip is still
/// put back into standby.
pub fn dump<G, S>(
	gpio: G,
	target: &DumpTarget,
	endianness: Endianness,
	mode: TransferMode,
	cancel: &CancelFlag,
	mut sink: S,
) -> crate::AResult<Outcome>
where
	G: Gpio,
	S: DumpSink,
{
	let mut session = DumpSession::start(gpio, target, endianness, mode, cancel)?;

	sink.start()?;
	for data in session.by_ref() {
		sink.byte(data)?;
	}
	sink.end()?;

	session.outcome().ok_or_else(|| format_err!("dump session stopped without finishing"))
}
