pub mod maintenance;
pub mod survey;
