mod document;
mod strategy;

pub use document::{extract_leaf_price, unit_price, DocumentError, LeafPrice, PriceDocument};
pub use strategy::{
    split_rates, DualRate, LcuDimension, LcuDimensions, LcuProfile, LcuUsage, PricingStrategy,
    RuleEvaluation,
};
