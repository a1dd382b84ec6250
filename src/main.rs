#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

mod config;
mod device;
mod form;
mod glow;
mod interaction;
mod language;
mod logging;
mod motion;
mod navigation;
mod particles;
mod preferences;
mod reveal;
mod theme;
mod tilt;

#[cfg(target_arch = "wasm32")]
mod composer;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod engine;
#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("This project is frontend-only. Run `trunk serve` or `trunk build --release`.");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}
