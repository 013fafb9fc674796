// Domain layer: UI state models, page events and the ports the controllers talk through.

pub mod events;
pub mod model;
pub mod ports;
