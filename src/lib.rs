//! outline2pcb - Turn a board outline into fabrication files
//!
//! A board is built from a traced outline, populated with footprints and
//! routed nets, laid out into manufacturing layers and finally rendered as
//! Gerber RS-274X artwork, Excellon drill files and SVG previews.

pub mod archive;
pub mod board;
pub mod component;
pub mod components;
pub mod config;
pub mod dedup;
pub mod error;
pub mod excellon;
pub mod generator;
pub mod gerber;
pub mod input;
pub mod layer;
pub mod net;
pub mod outline;
pub mod output;
pub mod progress;
pub mod shape;
pub mod svg;

pub use board::Board;
pub use error::{PcbError, Result};
pub use generator::Generator;
pub use net::Net;
pub use outline::Outline;
