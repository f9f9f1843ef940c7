pub mod showing;
pub mod theater;
