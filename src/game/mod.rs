pub mod bird;
pub mod constants;
pub mod pipe;
pub mod state;
