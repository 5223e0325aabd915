mod chsh;
mod correlations;
mod games;
