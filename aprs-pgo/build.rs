//! Captures the compilation target so the default instrumented binary path
//! matches the per-target directory the PGO build tool writes into.

fn main() {
    let target = std::env::var("TARGET").unwrap_or_default();
    println!("cargo:rustc-env=APRS_PGO_HOST_TRIPLE={target}");
    println!("cargo:rerun-if-changed=build.rs");
}
