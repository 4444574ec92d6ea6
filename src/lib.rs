//! Relative prop rating engine: scores sports-betting propositions against
//! the slate they arrive in. Six weighted factor signals feed a composite
//! that is re-normalized per side into the public 40-95 band, nudged by
//! bounded volatility/consensus corrections, and classified into grade,
//! color, and confidence tiers with reasoning.

pub mod adjust;
pub mod classify;
pub mod factors;
pub mod fake_feed;
pub mod params;
pub mod prop;
pub mod rating;
pub mod report;
pub mod slate;
