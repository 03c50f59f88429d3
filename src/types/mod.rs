//! Plain data types shared by the layout and render modules.

mod range;

pub use range::*;
