pub mod compare_config;
pub mod harness;
pub mod problem;
pub mod report;

pub use compare_config::CompareConfig;
pub use harness::{compare_strategies, random_problem};
pub use problem::Problem;
pub use report::{ComparisonReport, StrategyTiming};
