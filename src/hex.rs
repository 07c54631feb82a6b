use std::io;

use crate::dump::DumpSink;

/// bytes per output line, same as `xxd -p -c 32`
pub const BYTES_PER_LINE: usize = 32;

/// Plain hex output, can be turned back into binary with `xxd -r -p`.
pub struct HexSink<W: io::Write> {
	out: W,
	column: usize,
	written: u64,
}

impl<W: io::Write> HexSink<W> {
	pub fn new(out: W) -> Self {
		HexSink {
			out,
			column: 0,
			written: 0,
		}
	}

	/// number of bytes written since the last `start`
	pub fn written(&self) -> u64 {
		self.written
	}

	pub fn into_inner(self) -> W {
		self.out
	}
}

impl<W: io::Write> DumpSink for HexSink<W> {
	fn start(&mut self) -> crate::AResult<()> {
		self.column = 0;
		self.written = 0;
		Ok(())
	}

	fn byte(&mut self, data: u8) -> crate::AResult<()> {
		write!(self.out, "{:02x}", data)?;
		self.written += 1;
		self.column += 1;
		if self.column == BYTES_PER_LINE {
			self.out.write_all(b"\n")?;
			self.column = 0;
		}
		Ok(())
	}

	fn end(&mut self) -> crate::AResult<()> {
		if 0 != self.column {
			self.out.write_all(b"\n")?;
			self.column = 0;
		}
		self.out.flush()?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn render(data: &[u8]) -> String {
		let mut sink = HexSink::new(Vec::new());
		sink.start().unwrap();
		for &b in data {
			sink.byte(b).unwrap();
		}
		sink.end().unwrap();
		assert_eq!(sink.written(), data.len() as u64);
		String::from_utf8(sink.into_inner()).unwrap()
	}

	#[test]
	fn short_line() {
		assert_eq!(render(&[0x12, 0x34, 0xab, 0x0f]), "1234ab0f\n");
	}

	#[test]
	fn empty() {
		assert_eq!(render(&[]), "");
	}

	#[test]
	fn wraps_lines() {
		let data: Vec<u8> = (0..40).collect();
		let text = render(&data);
		let lines: Vec<&str> = text.lines().collect();
		assert_eq!(lines.len(), 2);
		assert_eq!(lines[0].len(), 2 * BYTES_PER_LINE);
		assert_eq!(lines[1], "2021222324252627");
		assert!(text.ends_with('\n'));
	}

	#[test]
	fn exact_line_has_no_blank_line() {
		let text = render(&[0xff; BYTES_PER_LINE]);
		assert_eq!(text, format!("{}\n", "ff".repeat(BYTES_PER_LINE)));
	}
}
