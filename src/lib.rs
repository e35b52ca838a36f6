//! Geo point clustering for map markers
//!
//! Points are clustered once per load for every zoom level between
//! `min_zoom` and `max_zoom`; viewport queries then only read the
//! prebuilt per-zoom K-D trees.

pub mod cluster;
