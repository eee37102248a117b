//! Wireless Network Simulation Library
//!
//! Base stations and mobile users on a 2D map, related through a
//! key-addressed graph and stepped by a background thread.

pub mod simulation;
