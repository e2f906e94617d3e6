//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `clinic_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("clinic_core ping={}", clinic_core::ping());
    println!("clinic_core version={}", clinic_core::core_version());
}
