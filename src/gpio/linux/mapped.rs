use std::ffi::CString;
use std::fs;
use std::io;
use std::os::unix::io::{
	FromRawFd,
};
use std::ptr;

use libc::{
	MAP_SHARED,
	O_CLOEXEC,
	O_RDWR,
	O_SYNC,
	PROT_READ,
	PROT_WRITE,
	_SC_PAGESIZE,
	c_void,
	mmap,
	munmap,
	off_t,
	open,
	sysconf,
};

#[derive(Debug)]
pub struct Mapped {
	ptr: ptr::NonNull<u8>, // u8 instead of void for easier offset operations
	len: usize,
	// keep the descriptor open as long as the mapping lives
	_file: fs::File,
}

impl Drop for Mapped {
	fn drop(&mut self) {
		unsafe {
			let res = munmap(
				self.ptr.as_ptr() as *mut c_void,
				self.len,
			);
			if 0 != res {
				panic!("munmap failed: {}", io::Error::last_os_error());
			}
		}
	}
}

impl Mapped {
	pub fn len(&self) -> usize {
		self.len
	}

	// registers: always volatile
	pub fn read_byte(&self, offset: usize) -> u8 {
		assert!(offset < self.len);
		unsafe { ptr::read_volatile(self.ptr.as_ptr().add(offset)) }
	}

	pub fn write_byte(&mut self, offset: usize, data: u8) {
		assert!(offset < self.len);
		unsafe { ptr::write_volatile(self.ptr.as_ptr().add(offset), data) }
	}
}

fn page_size() -> io::Result<u64> {
	let size = unsafe { sysconf(_SC_PAGESIZE) };
	if size <= 0 {
		return Err(io::Error::last_os_error());
	}
	Ok(size as u64)
}

// TODO: exclusive open / file locking?
pub fn inner_open(path: &str, offset: u64, len: usize) -> io::Result<Mapped> {
	if 0 != offset % page_size()? {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("offset 0x{:x} is not page aligned", offset),
		));
	}
	if offset > off_t::max_value() as u64 {
		return Err(io::Error::new(
			io::ErrorKind::InvalidInput,
			format!("offset 0x{:x} too large", offset),
		));
	}

	let path = CString::new(path)?;

	let fd = unsafe { open(path.as_ptr(), O_RDWR | O_CLOEXEC | O_SYNC) };
	if -1 == fd {
		return Err(io::Error::last_os_error());
	}
	// now get fd managed to prevent resource leak
	let f = unsafe { fs::File::from_raw_fd(fd) };

	let area = unsafe {
		mmap(
			ptr::null_mut(),
			len,
			PROT_READ | PROT_WRITE,
			MAP_SHARED,
			fd,
			offset as off_t,
		)
	};

	if area as usize == !0usize {
		return Err(io::Error::last_os_error());
	}
	match ptr::NonNull::new(area as *mut u8) {
		None => panic!("mmap shouldn't return NULL ever"),
		Some(area) => Ok(Mapped{
			ptr: area,
			len,
			_file: f,
		}),
	}
}
