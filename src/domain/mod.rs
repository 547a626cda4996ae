// Domain layer: entities, the sheet/cell model and the ports the jobs run against.

pub mod model;
pub mod ports;
pub mod sheet;
