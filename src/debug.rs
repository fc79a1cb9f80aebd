#![cfg(not(target_arch = "wasm32"))]

use std::time::Instant;

pub fn time_secs<R>(f: impl FnOnce() -> R) -> (f32, R) {
    let start = Instant::now();
    let result = f();
    (start.elapsed().as_secs_f32(), result)
}
