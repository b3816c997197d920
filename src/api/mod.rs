pub mod absence;
pub mod eligibility;
pub mod user;
