use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use fll_gen::RunConfig;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// YAML run configuration.
    #[arg(long)]
    pub config: PathBuf,
}

pub fn run(args: &ValidateArgs) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    match config.validate() {
        Ok(params) => {
            println!(
                "{}",
                serde_json::json!({
                    "status": "ok",
                    "process": params.process().label(),
                    "target_nodes": params.target_nodes(),
                    "max_steps": params.max_steps(),
                })
            );
            Ok(())
        }
        Err(err) => {
            tracing::warn!(
                config = %args.config.display(),
                error = %err,
                "configuration rejected"
            );
            if let Some(reason) = err.config_reason() {
                println!(
                    "{}",
                    serde_json::json!({ "status": "rejected", "reason": reason.code() })
                );
            }
            Err(err.into())
        }
    }
}
