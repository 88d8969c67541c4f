pub mod forecast;
pub mod outcome;
