//! Console command `dump nor <endianness> <word_mode>`

use std::io;

use crate::cancel::CancelFlag;
use crate::dump::{
	DumpSink,
	DumpTarget,
	Endianness,
	TransferMode,
	dump,
};
use crate::gpio::Gpio;

pub const USAGE: &str = "Please supply an endianness and word-mode parameter\n\
	dump nor <endianness> <word_mode>\n\
	<endianness> = 0 or 1\n\
	<word_mode> = 0 or 1\n";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DumpArguments {
	pub endianness: u32,
	pub word_mode: u32,
}

impl Default for DumpArguments {
	fn default() -> Self {
		DumpArguments {
			endianness: 1,
			word_mode: 1,
		}
	}
}

// leading whitespace, an optional sign, then a run of decimal digits;
// returns the value and whatever follows the digits. A minus wraps around
// like C's `%u` does.
fn scan_unsigned(input: &str) -> Option<(u32, &str)> {
	let input = input.trim_start();
	let (negative, input) = match input.as_bytes().first() {
		Some(&b'-') => (true, &input[1..]),
		Some(&b'+') => (false, &input[1..]),
		_ => (false, input),
	};
	let digits = input.bytes().take_while(u8::is_ascii_digit).count();
	if 0 == digits {
		return None;
	}
	let value = input[..digits].bytes().fold(0u32, |value, digit| {
		value.saturating_mul(10).saturating_add((digit - b'0') as u32)
	});
	let value = if negative { value.wrapping_neg() } else { value };
	Some((value, &input[digits..]))
}

/// Parse up to two unsigned integers.
///
/// Each value is the digit run at the start of its field; whatever follows
/// the digits ends the field. Parsing stops at the first field without
/// digits, the remaining values keep their default (`1`).
pub fn parse_arguments(arguments: &str) -> DumpArguments {
	let mut result = DumpArguments::default();

	if let Some((endianness, rest)) = scan_unsigned(arguments) {
		result.endianness = endianness;
		if let Some((word_mode, _)) = scan_unsigned(rest) {
			result.word_mode = word_mode;
		}
	}

	result
}

/// A line typed on the console
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConsoleLine {
	Empty,
	Help,
	/// `dump nor` with its (possibly empty) arguments
	DumpNor(String),
	Unknown,
}

pub fn parse_line(line: &str) -> ConsoleLine {
	let mut words = line.split_whitespace();
	match (words.next(), words.next()) {
		(None, _) => ConsoleLine::Empty,
		(Some("help"), None) => ConsoleLine::Help,
		(Some("dump"), Some("nor")) => ConsoleLine::DumpNor(words.collect::<Vec<_>>().join(" ")),
		_ => ConsoleLine::Unknown,
	}
}

/// What to do for the given arguments
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Request {
	Usage,
	EndiannessTooHigh(u32),
	Dump(Endianness, TransferMode),
}

pub fn interpret(arguments: &str) -> Request {
	let arguments = arguments.trim();
	if arguments.is_empty() {
		return Request::Usage;
	}
	let parsed = parse_arguments(arguments);
	match Endianness::from_selector(parsed.endianness) {
		None => Request::EndiannessTooHigh(parsed.endianness),
		Some(endianness) => Request::Dump(endianness, TransferMode::from_selector(parsed.word_mode)),
	}
}

/// Run `dump nor` with `arguments`; messages go to `console`, the dump to
/// `sink`. The bus is only touched if the arguments are valid.
pub fn cmd_dump_nor<W, G, S>(
	arguments: &str,
	console: &mut W,
	gpio: G,
	target: &DumpTarget,
	cancel: &CancelFlag,
	sink: S,
) -> crate::AResult<()>
where
	W: io::Write + ?Sized,
	G: Gpio,
	S: DumpSink,
{
	match interpret(arguments) {
		Request::Usage => {
			console.write_all(USAGE.as_bytes())?;
		},
		Request::EndiannessTooHigh(value) => {
			debug!("rejecting endianness {}", value);
			console.write_all(b"Value too high. Max 1!\n")?;
		},
		Request::Dump(endianness, mode) => {
			info!("NOR dump: endianness {:?}, mode {:?}, 0x{:x} addresses", endianness, mode, target.length);
			console.write_all(b"\nStarting nor flash dump: \n")?;
			console.flush()?;
			let outcome = dump(gpio, target, endianness, mode, cancel, sink)?;
			info!("NOR dump finished: {:?}", outcome);
		},
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::nor::BusGeometry;
	use crate::sim::SimulatedFlash;

	fn run(arguments: &str, image: &[u8]) -> (String, Vec<u8>, SimulatedFlash) {
		let mut sim = SimulatedFlash::from_bytes(BusGeometry::DEFAULT, image);
		let target = DumpTarget {
			geometry: BusGeometry::DEFAULT,
			length: image.len() as u64 / 2,
		};
		let mut console = Vec::new();
		let mut out = Vec::new();
		cmd_dump_nor(arguments, &mut console, &mut sim, &target, &CancelFlag::new(), &mut out).unwrap();
		(String::from_utf8(console).unwrap(), out, sim)
	}

	#[test]
	fn parse() {
		assert_eq!(parse_arguments("0 0"), DumpArguments { endianness: 0, word_mode: 0 });
		assert_eq!(parse_arguments("  1\t0 "), DumpArguments { endianness: 1, word_mode: 0 });
		assert_eq!(parse_arguments("0"), DumpArguments { endianness: 0, word_mode: 1 });
		assert_eq!(parse_arguments("x 0"), DumpArguments { endianness: 1, word_mode: 1 });
		assert_eq!(parse_arguments("0 x"), DumpArguments { endianness: 0, word_mode: 1 });
		assert_eq!(parse_arguments("3 9 7"), DumpArguments { endianness: 3, word_mode: 9 });
	}

	#[test]
	fn parse_stops_at_first_non_digit() {
		assert_eq!(parse_arguments("0,0"), DumpArguments { endianness: 0, word_mode: 1 });
		assert_eq!(parse_arguments("0abc 0"), DumpArguments { endianness: 0, word_mode: 1 });
		assert_eq!(parse_arguments("1 0x"), DumpArguments { endianness: 1, word_mode: 0 });
		assert_eq!(parse_arguments("0\t\n1"), DumpArguments { endianness: 0, word_mode: 1 });
		assert_eq!(parse_arguments("- 0"), DumpArguments { endianness: 1, word_mode: 1 });
		assert_eq!(parse_arguments("+0 -0"), DumpArguments { endianness: 0, word_mode: 0 });
		assert_eq!(interpret("-1 0"), Request::EndiannessTooHigh(u32::max_value()));
		assert_eq!(parse_arguments("99999999999 0"), DumpArguments { endianness: u32::max_value(), word_mode: 0 });
		assert_eq!(interpret("0,0"), Request::Dump(Endianness::LittleEndian, TransferMode::Word));
		assert_eq!(interpret("0abc 0"), Request::Dump(Endianness::LittleEndian, TransferMode::Word));
		assert_eq!(interpret("0 0,"), Request::Dump(Endianness::LittleEndian, TransferMode::Byte));
	}

	#[test]
	fn console_lines() {
		assert_eq!(parse_line(""), ConsoleLine::Empty);
		assert_eq!(parse_line(" \t "), ConsoleLine::Empty);
		assert_eq!(parse_line("help"), ConsoleLine::Help);
		assert_eq!(parse_line("  help  "), ConsoleLine::Help);
		assert_eq!(parse_line("help me"), ConsoleLine::Unknown);
		assert_eq!(parse_line("dump nor"), ConsoleLine::DumpNor(String::new()));
		assert_eq!(parse_line("dump  nor 0 1"), ConsoleLine::DumpNor("0 1".to_owned()));
		assert_eq!(parse_line("dump\tnor\t1   0 "), ConsoleLine::DumpNor("1 0".to_owned()));
		assert_eq!(parse_line("dump nand 0 1"), ConsoleLine::Unknown);
		assert_eq!(parse_line("dump"), ConsoleLine::Unknown);
	}

	#[test]
	fn interpret_requests() {
		assert_eq!(interpret(""), Request::Usage);
		assert_eq!(interpret(" \n"), Request::Usage);
		assert_eq!(interpret("2 1"), Request::EndiannessTooHigh(2));
		assert_eq!(interpret("0 0"), Request::Dump(Endianness::LittleEndian, TransferMode::Byte));
		assert_eq!(interpret("1 5"), Request::Dump(Endianness::BigEndian, TransferMode::Word));
		// unparsable input falls back to big endian word mode
		assert_eq!(interpret("foo"), Request::Dump(Endianness::BigEndian, TransferMode::Word));
	}

	#[test]
	fn empty_arguments_print_usage() {
		let (console, out, sim) = run("", &[1, 2, 3, 4]);
		assert_eq!(console, USAGE);
		assert!(console.lines().count() >= 2);
		assert!(out.is_empty());
		assert_eq!(sim.calls(), 0);
	}

	#[test]
	fn endianness_too_high() {
		let (console, out, sim) = run("2 1", &[1, 2, 3, 4]);
		assert_eq!(console, "Value too high. Max 1!\n");
		assert!(out.is_empty());
		assert_eq!(sim.calls(), 0);
	}

	#[test]
	fn dumps_words() {
		let (console, out, sim) = run("0 1", &[0xcd, 0xab, 0x34, 0x12]);
		assert!(console.contains("Starting nor flash dump"));
		assert_eq!(out, vec![0xab, 0xcd, 0x12, 0x34]);
		assert_eq!(sim.sampled(), &[0, 1]);
	}

	#[test]
	fn nonzero_word_mode_is_word_mode() {
		let (_, out, _) = run("1 42", &[0xcd, 0xab, 0x34, 0x12]);
		assert_eq!(out, vec![0xcd, 0xab, 0x34, 0x12]);
	}

	#[test]
	fn byte_mode() {
		let (_, out, sim) = run("1 0", &[0x12, 0x34, 0x56, 0x78]);
		// length counts addresses: two of them in byte mode
		assert_eq!(out, vec![0x12, 0x34]);
		assert_eq!(sim.sampled(), &[0, 1]);
	}
}
