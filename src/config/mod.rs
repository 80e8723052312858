mod core;
mod loader;
mod scoring;
mod thresholds;

pub use self::core::{DocstringConfig, PyqualConfig};
pub use loader::{
    directory_ancestors, load_config, load_config_from, parse_and_validate_config,
    CONFIG_FILE_NAME,
};
pub use scoring::{
    default_complexity_weight, default_critical_cost, default_documentation_weight,
    default_info_cost, default_maintainability_weight, default_smells_weight,
    default_warning_cost, DebtCosts, ScoringWeights,
};
pub use thresholds::{
    default_max_cyclomatic, default_max_function_length, default_max_nesting,
    default_max_parameters, Thresholds,
};
