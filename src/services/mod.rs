//! File-facing services used by the processor

pub mod format;
pub mod io;

pub use format::OutputFormatHandler;
pub use io::ImageIOService;
