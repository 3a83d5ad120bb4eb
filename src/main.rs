//! pd-hygiene: print a licence/schedule/invitation hygiene report for the
//! PagerDuty account behind `PD_API_KEY`.

use std::io::Write;
use std::process::ExitCode;

use pd_hygiene_lib::error::HygieneError;
use pd_hygiene_lib::pagerduty::PagerDutyClient;
use pd_hygiene_lib::{config, hygiene, run_hygiene};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            if e.requires_user_action() {
                log::error!("{}", e.recovery_suggestion());
            } else {
                log::warn!("{}", e.recovery_suggestion());
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), HygieneError> {
    let config = config::load_config()?;
    let api_key = config::api_key()?;
    let client = PagerDutyClient::new(&api_key, &config)?;
    log::debug!("Using {:?}", client);

    let today = chrono::Utc::now().date_naive();
    let run = run_hygiene(&client, &config, today).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    hygiene::write_report(&run.report, &mut out)?;
    out.flush()?;
    Ok(())
}
