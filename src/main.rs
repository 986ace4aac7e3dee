use std::process;

use pawboard::{
    application::error::{AppError, ErrorReport},
    config::{self, Command},
    infra::{http::ApiClient, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error};
use tracing_subscriber::fmt as tracing_fmt;

mod handlers;
mod print;

use handlers::{Ctx, news, org_requests, reports};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    let report = ErrorReport::from_error("pawboard", error);
    if dispatcher::has_been_set() {
        error!(error = %error, chain = ?report.messages, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, chain = ?report.messages, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging)?;
    let client = ApiClient::from_settings(&settings.api)?;
    let ctx = Ctx::new(client, settings);

    match cli_args.command {
        Command::Reports(args) => reports::handle(&ctx, args.command).await,
        Command::OrgRequests(args) => org_requests::handle(&ctx, args.command).await,
        Command::News(args) => news::handle(&ctx, args.command).await,
    }
}
