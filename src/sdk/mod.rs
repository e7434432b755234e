pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod export;
pub mod model;
pub mod projection;
pub mod routing;
pub mod selection;
pub mod session;
pub mod util;
