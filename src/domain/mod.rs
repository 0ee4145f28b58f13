// Domain layer: publication models and the ports the analyzer and adapters meet at.

pub mod model;
pub mod ports;
