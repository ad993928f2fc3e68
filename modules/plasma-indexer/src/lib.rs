pub mod replay;

pub use replay::{event_lines, replay};
