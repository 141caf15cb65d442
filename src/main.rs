use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    match energy_sensemaker::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("exiting with code {}: {err:?}", err.exit_code());
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
