//! The `synchrad` crate simulates the motion of relativistic charged
//! particles through superposed electric and magnetic field configurations
//! and computes the electromagnetic radiation they emit.

pub mod beam;
pub mod constants;
pub mod ensemble;
pub mod error;
pub mod field;
pub mod geometry;
pub mod num;
pub mod radiation;
pub mod random;
pub mod simulator;
pub mod trajectory;
pub mod units;
