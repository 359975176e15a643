//! Core module for program guide data, layout and interaction.

pub mod config;
pub mod culling;
pub mod epg;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gesture;
pub mod image_cache;
pub mod mock;
pub mod model;
pub mod parser;
pub mod scroll;
pub mod time_axis;
pub mod time_format;
