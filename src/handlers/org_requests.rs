use std::sync::Arc;

use pawboard::{
    application::error::AppError,
    config::{ActionArgs, ListArgs, OrgRequestsCommand},
    domain::{
        entities::OrganizationRequest,
        moderation::Decision,
        types::{OrganizationRequestStatus, Resource},
    },
    infra::http::OrganizationRequestsApi,
};

use super::{Ctx, act, print_page, validate_status};

pub async fn handle(ctx: &Ctx, cmd: OrgRequestsCommand) -> Result<(), AppError> {
    match cmd {
        OrgRequestsCommand::List(args) => list(ctx, &args).await,
        OrgRequestsCommand::Approve(args) => decide(ctx, Decision::approve(), &args).await,
        OrgRequestsCommand::Reject(args) => decide(ctx, Decision::reject(), &args).await,
    }
}

async fn list(ctx: &Ctx, args: &ListArgs) -> Result<(), AppError> {
    validate_status::<OrganizationRequestStatus>(args)?;
    let api = Arc::new(OrganizationRequestsApi::new(ctx.client.clone()));
    let list = ctx
        .load::<OrganizationRequest>(
            Resource::OrganizationRequests.path(),
            api,
            ctx.list_query(args),
        )
        .await?;
    print_page(&list)
}

async fn decide(ctx: &Ctx, decision: Decision, args: &ActionArgs) -> Result<(), AppError> {
    validate_status::<OrganizationRequestStatus>(&args.list)?;
    let api = Arc::new(OrganizationRequestsApi::new(ctx.client.clone()));
    let mut list = ctx
        .load::<OrganizationRequest>(
            Resource::OrganizationRequests.path(),
            api.clone(),
            ctx.list_query(&args.list),
        )
        .await?;
    act::<OrganizationRequest, Decision>(ctx, &mut list, api, decision, args).await
}
