//! Contact-driven fluid behaviour. Every pass here reads the contact sets
//! built earlier in the step and writes velocities only.

pub mod color_mixing;
pub mod damping;
pub mod powder;
pub mod pressure;
pub mod tensile;
pub mod viscosity;
