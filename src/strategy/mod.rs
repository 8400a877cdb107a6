// Signal engine
pub mod moving_average;
pub mod signals;

pub use signals::decide_action;
