//! Build script for the transceiver firmware
//!
//! Handles:
//! - Memory layout configuration for the embedded binary

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds (simulator, tests) need no linker setup
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    // Tell Cargo to re-run this if the linker script changes
    println!("cargo:rerun-if-changed=memory.x");

    // Link memory.x from project directory
    if let Ok(dir) = std::env::var("CARGO_MANIFEST_DIR") {
        println!("cargo:rustc-link-search={dir}");
    }
}
