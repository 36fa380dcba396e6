//! 2D particle simulation coupled to a rigid-body world.
//!
//! Particles live as rows across dense per-attribute columns and are found
//! through a sorted spatial-tag index. Each [`ParticleSystem::step`] runs a
//! fixed pipeline of velocity passes (gravity, fixture collision, rigid
//! groups, pressure, viscosity, surface tension, springs, elastic triads and
//! more), integrates positions once, and compacts destroyed particles.
//!
//! The rigid-body side is abstracted by [`RigidWorld`]; group shapes by
//! [`Shape`]; triangulation for elastic groups by [`Triangulator`].

pub mod buffer;
pub mod callbacks;
mod compaction;
pub mod config;
pub mod constraints;
pub mod contacts;
pub mod error;
pub mod fluids;
pub mod forces;
pub mod grid;
pub mod group;
pub mod math;
pub mod particle;
mod query;
pub mod shape;
mod solver;
pub mod stats;
pub mod system;
pub mod voronoi;
pub mod world;

pub use callbacks::{DestructionListener, QueryCallback, RaycastCallback};
pub use config::{settings, ParticleSystemDef};
pub use contacts::{Pair, ParticleBodyContact, ParticleContact, Triad};
pub use error::ParticleError;
pub use grid::Proxy;
pub use group::{GroupFlags, GroupId, GroupStatistics, ParticleGroup, ParticleGroupDef};
pub use math::{Aabb, RayCastInput, RayCastOutput, Rot, TimeStep, Transform};
pub use particle::{ParticleColor, ParticleDef, ParticleFlags};
pub use shape::Shape;
pub use stats::StepStats;
pub use system::ParticleSystem;
pub use voronoi::{Triangulator, VoronoiDiagram};
pub use world::{BodyHandle, BodyState, EmptyWorld, FixtureHandle, RigidWorld};
