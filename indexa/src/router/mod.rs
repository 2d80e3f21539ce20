pub mod compose;
pub mod convert;
pub mod observations;
pub mod series;

pub mod util;
