pub mod observation;
pub mod time;


pub use observation::*;
pub use time::*;
