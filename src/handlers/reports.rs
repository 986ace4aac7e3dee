use std::sync::Arc;

use pawboard::{
    application::error::AppError,
    config::{ActionArgs, ListArgs, ReportActionArg, ReportActArgs, ReportsCommand},
    domain::{
        entities::Report,
        moderation::ReportAction,
        types::{ReportStatus, Resource},
    },
    infra::http::ReportsApi,
};

use super::{Ctx, act, print_page, validate_status};

pub async fn handle(ctx: &Ctx, cmd: ReportsCommand) -> Result<(), AppError> {
    match cmd {
        ReportsCommand::List(args) => list(ctx, &args).await,
        ReportsCommand::Act(ReportActArgs { action, target }) => {
            act_on(ctx, report_action(action), &target).await
        }
    }
}

fn report_action(arg: ReportActionArg) -> ReportAction {
    match arg {
        ReportActionArg::Hide => ReportAction::hide(),
        ReportActionArg::Delete => ReportAction::delete(),
        ReportActionArg::Dismiss => ReportAction::dismiss(),
    }
}

async fn list(ctx: &Ctx, args: &ListArgs) -> Result<(), AppError> {
    validate_status::<ReportStatus>(args)?;
    let api = Arc::new(ReportsApi::new(ctx.client.clone()));
    let list = ctx
        .load::<Report>(Resource::Reports.path(), api, ctx.list_query(args))
        .await?;
    print_page(&list)
}

async fn act_on(ctx: &Ctx, action: ReportAction, args: &ActionArgs) -> Result<(), AppError> {
    validate_status::<ReportStatus>(&args.list)?;
    let api = Arc::new(ReportsApi::new(ctx.client.clone()));
    let mut list = ctx
        .load::<Report>(
            Resource::Reports.path(),
            api.clone(),
            ctx.list_query(&args.list),
        )
        .await?;
    act::<Report, ReportAction>(ctx, &mut list, api, action, args).await
}
