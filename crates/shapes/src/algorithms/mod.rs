pub mod filter;
pub mod background;
pub mod classification;

pub use filter::*;
pub use background::*;
pub use classification::*;
