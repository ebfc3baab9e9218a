pub mod export;
pub mod outcome_model;
pub mod rankings;
pub mod teams;
pub mod trend;
pub mod value;
