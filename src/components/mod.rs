//! Built-in footprints

mod connector;
mod led;

pub use connector::Connector;
pub use led::Led;
