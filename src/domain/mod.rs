// Domain layer: models, the label table and ports (interfaces).

pub mod language;
pub mod model;
pub mod ports;
