//! Build script
//!
//! With the `rt` feature, places `device.x` (weak interrupt handler aliases) on the linker search
//! path, where `cortex-m-rt`'s `link.x` picks it up.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=device.x");

    if env::var_os("CARGO_FEATURE_RT").is_some() {
        let out = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo"));
        fs::copy("device.x", out.join("device.x")).expect("copy device.x");
        println!("cargo:rustc-link-search={}", out.display());
    }
}
