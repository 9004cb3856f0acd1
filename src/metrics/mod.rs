/// Confusion counts and classification scores
pub mod confusion;
