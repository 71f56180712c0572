pub mod fleet;
pub mod recommendation;
