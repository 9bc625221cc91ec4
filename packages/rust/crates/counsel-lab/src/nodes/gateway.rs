use counsel_lab::{Lab, LabConfig, run_http};

pub(crate) async fn run_gateway_mode(
    bind_addr: String,
    turn_timeout: Option<u64>,
    config: LabConfig,
) -> anyhow::Result<()> {
    let lab = Lab::from_config(config);
    run_http(lab, &bind_addr, turn_timeout).await
}
