//! Domain models and analytics for the AcciNex risk platform

mod accident;
mod alert;
mod cluster;
mod forecast;
mod gps;
mod heatmap;
mod hotspot;
mod pattern;
mod report;
mod risk;

pub use accident::*;
pub use alert::*;
pub use cluster::*;
pub use forecast::*;
pub use gps::*;
pub use heatmap::*;
pub use hotspot::*;
pub use pattern::*;
pub use report::*;
pub use risk::*;
