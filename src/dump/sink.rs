/// Receives the dumped bytes
///
/// `start` is signalled once the flash is ready, `end` when the dump is
/// complete or was cancelled.
pub trait DumpSink {
	fn start(&mut self) -> crate::AResult<()>;
	fn byte(&mut self, data: u8) -> crate::AResult<()>;
	fn end(&mut self) -> crate::AResult<()>;
}

impl<'a, S: ?Sized + DumpSink> DumpSink for &'a mut S {
	fn start(&mut self) -> crate::AResult<()> {
		(**self).start()
	}

	fn byte(&mut self, data: u8) -> crate::AResult<()> {
		(**self).byte(data)
	}

	fn end(&mut self) -> crate::AResult<()> {
		(**self).end()
	}
}

/// collect the raw bytes; start and end are not recorded
impl DumpSink for Vec<u8> {
	fn start(&mut self) -> crate::AResult<()> {
		Ok(())
	}

	fn byte(&mut self, data: u8) -> crate::AResult<()> {
		self.push(data);
		Ok(())
	}

	fn end(&mut self) -> crate::AResult<()> {
		Ok(())
	}
}
