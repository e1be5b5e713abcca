//! Terminal presentation
//!
//! Rendering is kept separate from printing so the layout can be tested
//! without a terminal. Styling comes from `console`, which drops colors
//! when output is not a terminal.

pub mod display;

pub use display::{print_gaps, print_plan, print_report};
