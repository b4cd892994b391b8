#[cfg(not(target_arch = "wasm32"))]
mod cli;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    cli::run();
}

// The wasm build only ships the console library.
#[cfg(target_arch = "wasm32")]
fn main() {}
