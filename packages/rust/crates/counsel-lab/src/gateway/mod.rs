//! Gateway namespace: HTTP and stdio participant surfaces.

mod http;
mod stdio;

pub use http::{
    FinalizeRequest, GatewayHealthResponse, GatewayState, InteractionResponse, LabelRequest,
    MessageRequest, StartRequest, TokenRequest, label_interaction, router, run_http,
    validate_message_request,
};
pub use stdio::{
    CONSOLE_HELP, ConsoleCommand, parse_console_command, render_notices, render_options,
    render_update, render_view, run_console,
};
