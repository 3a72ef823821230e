use std::env;
use std::path::PathBuf;

const HEADER: &str = "dynbuf.h";
const CONFIG: &str = "cbindgen.toml";

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed={CONFIG}");

    let crate_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap());
    let config = cbindgen::Config::from_file(crate_dir.join(CONFIG))
        .unwrap_or_else(|e| panic!("failed to read {CONFIG}: {e}"));

    let include_dir = crate_dir.join("include");
    std::fs::create_dir_all(&include_dir).expect("failed to create include/ directory");

    let bindings = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_config(config)
        .generate()
        .expect("cbindgen failed to generate the dynbuf header");
    bindings.write_to_file(include_dir.join(HEADER));
}
