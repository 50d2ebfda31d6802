//! Domain types of a checkout attempt and the ports the outside world plugs into.

pub mod money;
pub mod overlay;
pub mod ports;
pub mod redirect;
pub mod reference;
pub mod request;
pub mod session;
