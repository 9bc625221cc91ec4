use counsel_lab::{Lab, LabConfig, run_console};

pub(crate) async fn run_console_mode(name: Option<String>, config: LabConfig) -> anyhow::Result<()> {
    let lab = Lab::from_config(config);
    run_console(lab, name).await
}
