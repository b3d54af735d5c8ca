pub mod exposure;
pub mod settlement;
pub mod spending;
