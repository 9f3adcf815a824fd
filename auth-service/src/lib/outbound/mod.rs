pub mod clock;
pub mod repositories;
