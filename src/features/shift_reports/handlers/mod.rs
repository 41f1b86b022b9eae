mod submit_handler;

pub use submit_handler::*;
