pub mod ports;

pub use ports::{KnownRoutes, RouteOracle, SheetTransport};
