pub mod engine;

pub use engine::ReservationEngine;
