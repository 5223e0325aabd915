//! Property-based tests for correlations and repeated play.
