//! Output formatting for the VM topology.
//!
//! - [`terminal`] - Terminal output with colors

mod terminal;

pub use terminal::{format_disk, format_virtual_machine, print_topology};
