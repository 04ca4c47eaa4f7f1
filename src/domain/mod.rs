// Domain layer: table/label models and the ports (storage, pipeline) the stages plug into.

pub mod model;
pub mod ports;
