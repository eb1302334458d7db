use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match examsheets::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("examsheets: {err:#}");
            ExitCode::FAILURE
        }
    }
}
