//! Passes that move particles against the outside world: gravity, rigid
//! fixtures, rigid groups and walls.

pub mod collision;
pub mod gravity;
pub mod rigid;
pub mod wall;
