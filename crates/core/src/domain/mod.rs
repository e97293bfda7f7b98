pub mod showcase;
pub mod step;
