//! Asynchronous read protocol for parallel NOR flash (S29GL style), driven
//! through plain GPIO ports.
//!
//! - control port: CE#, OE#, WE#, WP#, RESET#, BYTE# as outputs, RY/BY# as
//!   input (not polled for reads)
//! - address bus: up to 32 lines on four ports
//! - data bus: DQ0..DQ7 on the first data port, DQ8..DQ15 on the second one
//!   (only used in word mode)
//!
//! Read cycle: drive address, pull CE# and OE# low, wait for the access
//! time, sample the data bus, pull OE# high again. BYTE# selects the bus
//! width: low for byte mode, high for word mode.
//!
//! Writing is not supported; WE# is held high the whole time.

mod geometry;
mod protocol;

pub use self::geometry::{
	BusGeometry,
	ControlLine,
	Direction,
	MAX_ADDRESS_LINES,
	NOT_CONNECTED,
	control_idle,
	control_outputs,
};

pub use self::protocol::{
	Bus,
	ReadCycle,
	TransferMode,
};
