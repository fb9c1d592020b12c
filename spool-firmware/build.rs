//! Build script for spool-firmware
//!
//! - Puts memory.x on the linker search path
//! - Adds the cortex-m-rt, RP2040 boot and defmt linker scripts

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        panic!("OUT_DIR not set by cargo");
    };

    if let Err(e) = fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")) {
        panic!("failed to copy memory.x: {e}");
    }

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}
