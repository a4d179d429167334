/**
 * file: mod.rs
 * desc: Expression module which implements the requested read count profiles.
 */
mod base;
mod fixed;
mod nbinom;
mod sample;

pub use self::base::{assign_expression, ExpressionProfile};
pub use self::fixed::FixedExpressionProfile;
pub use self::nbinom::{NegativeBinomial, NegativeBinomialExpressionProfile};
pub use self::sample::SampleExpressionProfile;

#[cfg(test)]
#[path = "../tests/expression_profile_tests.rs"]
mod expression_profile_tests;
