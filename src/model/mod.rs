pub mod demand;
pub mod inventory;
pub mod matrix;
pub mod reward;
pub mod transition;
