use std::fmt;
use std::thread;
use std::time::{
	Duration,
	Instant,
};

pub mod linux;

pub use self::linux::{
	PORT_STRIDE,
	PORT_WINDOW_LEN,
	open_port_window,
};

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

/// 8-bit GPIO port, identified by its index in the port register window
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Port(pub u8);

impl fmt::Display for Port {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "port{}", self.0)
	}
}

pub trait Gpio {
	// bits set in `outputs` become outputs, cleared bits inputs
	fn set_direction(&mut self, port: Port, outputs: u8);
	fn write(&mut self, port: Port, value: u8);
	fn read(&mut self, port: Port) -> u8;

	// wait (at least) `duration` for lines to settle
	fn delay(&mut self, duration: Duration) {
		reliable_sleep(duration);
	}
}

impl<'a, G: ?Sized + Gpio> Gpio for &'a mut G {
	fn set_direction(&mut self, port: Port, outputs: u8) {
		(**self).set_direction(port, outputs)
	}

	fn write(&mut self, port: Port, value: u8) {
		(**self).write(port, value)
	}

	fn read(&mut self, port: Port) -> u8 {
		(**self).read(port)
	}

	fn delay(&mut self, duration: Duration) {
		(**self).delay(duration)
	}
}

impl<G: ?Sized + Gpio> Gpio for Box<G> {
	fn set_direction(&mut self, port: Port, outputs: u8) {
		(**self).set_direction(port, outputs)
	}

	fn write(&mut self, port: Port, value: u8) {
		(**self).write(port, value)
	}

	fn read(&mut self, port: Port) -> u8 {
		(**self).read(port)
	}

	fn delay(&mut self, duration: Duration) {
		(**self).delay(duration)
	}
}
