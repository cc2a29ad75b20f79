pub mod entity;
pub mod geometry;
pub mod patrol;
pub mod physics;
pub mod player;
pub mod projectile;
