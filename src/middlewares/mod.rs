mod statistics;

pub use statistics::invalidate_statistics;
