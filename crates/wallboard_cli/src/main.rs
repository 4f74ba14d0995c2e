//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `wallboard_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("wallboard_core ping={}", wallboard_core::ping());
    println!("wallboard_core version={}", wallboard_core::core_version());
}
