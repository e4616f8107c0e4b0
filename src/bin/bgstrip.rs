//! bgstrip command-line tool
//!
//! Removes the background from one image using a segmentation model or a
//! corner flood fill.

#[cfg(feature = "cli")]
use bgstrip::cli;

#[cfg(feature = "cli")]
fn main() {
    let code = match cli::main() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        },
    };
    std::process::exit(code);
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
