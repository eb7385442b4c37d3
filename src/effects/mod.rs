//! Decorative landing page effects.
//!
//! Everything here is plain math over numbers the host reads from the page
//! (pointer position, scroll offset, element rectangles, elapsed time). The
//! browser host applies the results to styles; tests check them directly.

pub mod counter;
pub mod pointer;
pub mod scroll;

pub use counter::{ease_out_cubic, parse_counter_target, CounterAnimation, CounterGroup};
pub use pointer::{magnetic_offset, CursorGlow, Point, Rect};
pub use scroll::{
    anchor_id, is_active_link, parallax_offset, scroll_target, REDUCED_MOTION_VARS,
};
