mod routing_sweeper;

pub use routing_sweeper::RoutingSweeper;
