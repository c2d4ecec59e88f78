pub mod environment;
pub mod initialization;

pub use environment::{
    get_environment, initialize_logging_system, load_environment_variables, log_environment_file,
    Environment, EnvironmentConfig,
};
pub use initialization::{
    initialize_application, log_initialization_complete, resolve_data_file,
    InitializationResult,
};
