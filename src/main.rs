use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    design_extract_lib::init_logging();
    match design_extract_lib::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(code = err.code(), retryable = err.retryable(), "{err}");
            ExitCode::FAILURE
        }
    }
}
