pub mod binning;
pub mod catalog;
pub mod functions;
pub mod table;

pub use binning::*;
pub use catalog::*;
pub use functions::*;
pub use table::*;
