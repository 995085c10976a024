// build.rs - Link the terminal backend against the system notcurses library

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Only the `tui` feature talks to notcurses
    #[cfg(feature = "tui")]
    {
        match pkg_config::Config::new()
            .atleast_version("3.0.0")
            .probe("notcurses")
        {
            Ok(lib) => {
                for path in lib.link_paths {
                    println!("cargo:rustc-link-search=native={}", path.display());
                }
                for lib in lib.libs {
                    println!("cargo:rustc-link-lib={}", lib);
                }
            }
            Err(e) => {
                // Vendored bindings still need the library; try the default search path
                println!("cargo:warning=pkg-config could not find notcurses: {}", e);
                println!("cargo:rustc-link-lib=notcurses");
                println!("cargo:rustc-link-lib=notcurses-core");
            }
        }
    }
}
