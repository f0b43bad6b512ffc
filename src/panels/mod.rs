mod controls_panel;
mod output_panel;
mod sketch_panel;

pub use controls_panel::controls_panel;
pub use output_panel::{FAILURE_CAPTION, FAILURE_COLOR, failure_placeholder, output_panel};
pub use sketch_panel::sketch_panel;
