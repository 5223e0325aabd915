//! Property-based tests for the numeric kernels.
