use std::sync::Arc;

use pawboard::{
    application::error::AppError,
    config::{ActionArgs, ListArgs, NewsCommand},
    domain::{entities::NewsItem, moderation::NewsAction, types::Resource},
    infra::http::NewsApi,
};

use super::{Ctx, act, print_page};

pub async fn handle(ctx: &Ctx, cmd: NewsCommand) -> Result<(), AppError> {
    match cmd {
        NewsCommand::List(args) => list(ctx, &args).await,
        NewsCommand::Publish(args) => act_on(ctx, NewsAction::Publish, &args).await,
        NewsCommand::Unpublish(args) => act_on(ctx, NewsAction::Unpublish, &args).await,
        NewsCommand::Delete(args) => act_on(ctx, NewsAction::Delete, &args).await,
    }
}

async fn list(ctx: &Ctx, args: &ListArgs) -> Result<(), AppError> {
    let api = Arc::new(NewsApi::new(ctx.client.clone()));
    let list = ctx
        .load::<NewsItem>(Resource::News.path(), api, ctx.list_query(args))
        .await?;
    print_page(&list)
}

async fn act_on(ctx: &Ctx, action: NewsAction, args: &ActionArgs) -> Result<(), AppError> {
    let api = Arc::new(NewsApi::new(ctx.client.clone()));
    let mut list = ctx
        .load::<NewsItem>(Resource::News.path(), api.clone(), ctx.list_query(&args.list))
        .await?;
    act::<NewsItem, NewsAction>(ctx, &mut list, api, action, args).await
}
