pub(crate) mod config_runtime;
pub(crate) mod input;
pub(crate) mod runtime;
