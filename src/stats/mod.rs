pub mod levels;
pub mod sampling;

pub use levels::{
    analytic_level, density_levels, prune_lowest_density, standard_normal_pdf, LevelError,
    SIGMA_MASSES,
};
pub use sampling::{sample_bivariate_normal, BivariateNormal, SamplingError};
