// Caduceus - health assistant chat routing service
// Library exports

pub mod chat;
pub mod config;
pub mod pipeline;
pub mod server;
pub mod upstream;
