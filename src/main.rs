use bgp_guard::{CliArgs, FATAL_EXIT_STATUS, LoggingConfig, init_logging, run};
use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let _guard = match init_logging(LoggingConfig::from_env()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("bgp-guard: {:#}", err);
            return ExitCode::from(FATAL_EXIT_STATUS);
        }
    };

    // clap would exit with 2 on usage errors, which means "not a query" here
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(FATAL_EXIT_STATUS)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    ExitCode::from(run(args).await)
}
