//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `dayplan_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use dayplan_core::SlotCalendar;

fn main() {
    // Tiny probe to validate core crate wiring independently from the
    // Flutter/FFI runtime setup.
    let calendar = SlotCalendar::standard();
    println!("dayplan_core ping={}", dayplan_core::ping());
    println!("dayplan_core version={}", dayplan_core::core_version());
    println!(
        "dayplan_core slots={} first={} last={}",
        calendar.len(),
        calendar.label_at(0).unwrap_or("-"),
        calendar.label_at(calendar.len().saturating_sub(1)).unwrap_or("-")
    );
}
