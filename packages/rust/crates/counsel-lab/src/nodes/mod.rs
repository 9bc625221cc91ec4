mod console;
mod export;
mod gateway;

pub(crate) use console::run_console_mode;
pub(crate) use export::run_export_mode;
pub(crate) use gateway::run_gateway_mode;
