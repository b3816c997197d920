pub mod absence;
pub mod role;
