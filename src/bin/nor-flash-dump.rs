#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate nor_flash_dump;
use nor_flash_dump::*;

use std::fs;
use std::io::{
	self,
	BufRead,
	Write,
};
use std::process::exit;

use nor_flash_dump::command::ConsoleLine;
use nor_flash_dump::dump::DEFAULT_LENGTH;
use nor_flash_dump::gpio::Gpio;
use nor_flash_dump::hex::HexSink;
use nor_flash_dump::nor::{
	BusGeometry,
	MAX_ADDRESS_LINES,
};
use nor_flash_dump::sim::SimulatedFlash;

static CANCEL: CancelFlag = CancelFlag::new();

// Ctrl-C stops a running dump; without one it terminates as usual
extern "C" fn on_interrupt(signal: libc::c_int) {
	if !CANCEL.interrupt() {
		unsafe {
			libc::signal(signal, libc::SIG_DFL);
			libc::raise(signal);
		}
	}
}

fn install_interrupt_handler() -> AResult<()> {
	let handler = on_interrupt as extern "C" fn(libc::c_int);
	let previous = unsafe { libc::signal(libc::SIGINT, handler as libc::sighandler_t) };
	ensure!(previous != libc::SIG_ERR, "failed to install SIGINT handler: {}", io::Error::last_os_error());
	Ok(())
}

// decimal or 0x-prefixed hex
fn parse_number(value: &str) -> AResult<u64> {
	let value = value.trim();
	let result = if value.starts_with("0x") || value.starts_with("0X") {
		u64::from_str_radix(&value[2..], 16)
	} else {
		value.parse::<u64>()
	};
	result.map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid number {:?}: {}", value, e);
		e.context(msg).into()
	})
}

fn get_number(matches: &clap::ArgMatches, name: &str, default: u64) -> AResult<u64> {
	match matches.value_of(name) {
		None => Ok(default),
		Some(value) => parse_number(value).map_err(|e| {
			let msg = format!("invalid parameter {}: {}", name, e);
			e.context(msg).into()
		}),
	}
}

fn open_gpio(matches: &clap::ArgMatches, geometry: BusGeometry) -> AResult<Box<dyn Gpio>> {
	if let Some(image) = matches.value_of("image") {
		let data = fs::read(image).map_err(|e| format_err!("failed to read image {}: {}", image, e))?;
		info!("simulating NOR flash with {} bytes from {}", data.len(), image);
		return Ok(Box::new(SimulatedFlash::from_bytes(geometry, &data)));
	}

	let device = match matches.value_of("DEVICE") {
		Some(device) => device,
		None => bail!("either a DEVICE or --image is required"),
	};
	let offset = get_number(matches, "offset", 0)?;
	Ok(Box::new(gpio::open_port_window(device, offset)?))
}

fn print_help(console: &mut dyn Write) -> io::Result<()> {
	console.write_all(b"dump nor <endianness> <word_mode>  dump the whole NOR flash as hex\n")?;
	console.write_all(b"help                               show this text\n")
}

fn run_command(line: &str, console: &mut dyn Write, gpio: &mut dyn Gpio, target: &DumpTarget) -> AResult<()> {
	match command::parse_line(line) {
		ConsoleLine::Empty => Ok(()),
		ConsoleLine::Help => Ok(print_help(console)?),
		ConsoleLine::DumpNor(arguments) => {
			let stdout = io::stdout();
			let sink = HexSink::new(stdout.lock());
			command::cmd_dump_nor(&arguments, console, gpio, target, &CANCEL, sink)
		},
		ConsoleLine::Unknown => {
			writeln!(console, "Unknown command: {}", line.trim())?;
			Ok(())
		},
	}
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@arg DEVICE: "Port register window to map, e.g. /dev/mem")
		(@arg offset: --offset +takes_value "Offset of the port registers in DEVICE (page aligned)")
		(@arg length: --length +takes_value "Number of flash addresses to read")
		(@arg lines: --lines +takes_value "Number of connected address lines")
		(@arg image: --image +takes_value conflicts_with[DEVICE] "Simulate a flash chip holding this image instead of using hardware")
		(@arg command: -c --command +takes_value "Run a single console command and exit")
	).get_matches();

	let address_lines = get_number(&matches, "lines", MAX_ADDRESS_LINES as u64)?;
	ensure!(address_lines <= MAX_ADDRESS_LINES as u64, "at most {} address lines supported", MAX_ADDRESS_LINES);
	let target = DumpTarget {
		geometry: BusGeometry {
			address_lines: address_lines as u32,
			..BusGeometry::DEFAULT
		},
		length: get_number(&matches, "length", DEFAULT_LENGTH)?,
	};
	target.validate()?;

	let mut gpio = open_gpio(&matches, target.geometry)?;
	install_interrupt_handler()?;

	let stderr = io::stderr();
	let mut console = stderr.lock();

	if let Some(line) = matches.value_of("command") {
		return run_command(line, &mut console, &mut *gpio, &target);
	}

	let stdin = io::stdin();
	for line in stdin.lock().lines() {
		let line = line?;
		if let Err(e) = run_command(&line, &mut console, &mut *gpio, &target) {
			error!("{}: {}", line.trim(), e);
		}
	}

	Ok(())
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
