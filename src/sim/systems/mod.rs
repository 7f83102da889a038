pub mod collision;
pub mod forces;
pub mod lifecycle;
