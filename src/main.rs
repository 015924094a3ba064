//! # Voxel Streaming Demo Entry Point
//!
//! This is the main entry point for the native demo.
//! It simply calls into the library's `run()` function.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -- [config.json]
//! ```

fn main() {
    if let Err(err) = voxel_streaming::run() {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
