use std::sync::atomic::{
	AtomicBool,
	Ordering,
};

/// Request to stop a running dump
///
/// Only atomic flags, so it can be used from a signal handler. A dump arms
/// it while running, polls it before every address and clears it when it
/// starts.
#[derive(Debug, Default)]
pub struct CancelFlag {
	requested: AtomicBool,
	armed: AtomicBool,
}

impl CancelFlag {
	pub const fn new() -> Self {
		CancelFlag {
			requested: AtomicBool::new(false),
			armed: AtomicBool::new(false),
		}
	}

	pub fn cancel(&self) {
		self.requested.store(true, Ordering::SeqCst);
	}

	pub fn clear(&self) {
		self.requested.store(false, Ordering::SeqCst);
	}

	pub fn is_cancelled(&self) -> bool {
		self.requested.load(Ordering::SeqCst)
	}

	/// a dump is running and listening
	pub fn arm(&self) {
		self.armed.store(true, Ordering::SeqCst);
	}

	pub fn disarm(&self) {
		self.armed.store(false, Ordering::SeqCst);
	}

	pub fn is_armed(&self) -> bool {
		self.armed.load(Ordering::SeqCst)
	}

	/// Cancel a running dump.
	///
	/// Returns `false` (and leaves the request unset) if no dump is running;
	/// the caller should then handle the interrupt itself.
	pub fn interrupt(&self) -> bool {
		if !self.is_armed() {
			return false;
		}
		self.cancel();
		true
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stays_set_until_cleared() {
		let flag = CancelFlag::new();
		assert!(!flag.is_cancelled());
		flag.cancel();
		flag.cancel();
		assert!(flag.is_cancelled());
		assert!(flag.is_cancelled());
		flag.clear();
		assert!(!flag.is_cancelled());
	}

	#[test]
	fn usable_as_static() {
		static FLAG: CancelFlag = CancelFlag::new();
		FLAG.cancel();
		assert!(FLAG.is_cancelled());
		FLAG.clear();
	}

	#[test]
	fn interrupt_only_while_armed() {
		let flag = CancelFlag::new();
		assert!(!flag.interrupt());
		assert!(!flag.is_cancelled());

		flag.arm();
		assert!(flag.interrupt());
		assert!(flag.is_cancelled());

		flag.disarm();
		flag.clear();
		assert!(!flag.interrupt());
		assert!(!flag.is_cancelled());
	}
}
