//! Persistent structure between particles: springs over pairs, elastic
//! triangles over triads, and depth-based ejection between solid groups.

pub mod elastic;
pub mod solid;
pub mod spring;
