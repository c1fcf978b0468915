pub mod entities;
pub mod evaluator;
pub mod ports;
pub mod value_objects;
