//! Entry commands - create, get, update and delete cached values

use crate::cli::args::{CreateArgs, DeleteArgs, GetArgs, OutputFormat, TargetArgs, UpdateArgs};
use crate::commands::{CommandParameters, TemporaryCache, UpdateOutcome};
use crate::config::Config;
use crate::context::RequestContext;
use crate::error::TempCacheResult;
use console::style;
use serde_json::json;

async fn open(target: &TargetArgs, config: &Config) -> TempCacheResult<TemporaryCache> {
    TemporaryCache::open(config, target.region.into()).await
}

fn parameters(target: &TargetArgs, key: Option<&str>) -> CommandParameters {
    let context = RequestContext::new(target.user.as_str(), target.session.as_str());
    let mut params = CommandParameters::new(context, target.resource.as_str());
    params.key = key.map(Into::into);
    params.tab_id = target.tab;
    params
}

/// Execute the create command
pub async fn create(args: CreateArgs, config: &Config) -> TempCacheResult<()> {
    let cache = open(&args.target, config).await?;
    let params = parameters(&args.target, None).with_value(args.value);
    let key = cache.create(params).await?;

    match args.target.format {
        OutputFormat::Text => println!("{}", key),
        OutputFormat::Json => println!("{}", json!({ "key": key })),
    }
    Ok(())
}

/// Execute the get command
pub async fn get(args: GetArgs, config: &Config) -> TempCacheResult<()> {
    let cache = open(&args.target, config).await?;
    let value = cache
        .get(parameters(&args.target, args.key.as_deref()))
        .await?;

    match (args.target.format, value) {
        (OutputFormat::Json, value) => println!("{}", json!({ "value": value })),
        (OutputFormat::Text, Some(value)) => println!("{}", value),
        (OutputFormat::Text, None) => {
            eprintln!("{} No value stored under that key", style("!").yellow())
        }
    }
    Ok(())
}

/// Execute the update command
pub async fn update(args: UpdateArgs, config: &Config) -> TempCacheResult<()> {
    let cache = open(&args.target, config).await?;
    let params = parameters(&args.target, args.key.as_deref()).with_value(args.value);
    let outcome = cache.update(params).await?;

    match args.target.format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "outcome": outcome_name(&outcome), "key": outcome.key() })
        ),
        OutputFormat::Text => {
            if outcome.is_noop() {
                eprintln!(
                    "{} No entry under that key, nothing written",
                    style("!").yellow()
                );
            }
            if let Some(key) = outcome.key() {
                println!("{}", key);
            }
        }
    }
    Ok(())
}

/// Execute the delete command
pub async fn delete(args: DeleteArgs, config: &Config) -> TempCacheResult<()> {
    let cache = open(&args.target, config).await?;
    let removed = cache
        .delete(parameters(&args.target, args.key.as_deref()))
        .await?;

    match args.target.format {
        OutputFormat::Json => println!("{}", json!({ "deleted": removed })),
        OutputFormat::Text if removed => println!("{} Entry deleted", style("✓").green()),
        OutputFormat::Text => println!("{} No entry under that key", style("!").yellow()),
    }
    Ok(())
}

fn outcome_name(outcome: &UpdateOutcome) -> &'static str {
    match outcome {
        UpdateOutcome::Created(_) => "created",
        UpdateOutcome::Updated(_) => "updated",
        UpdateOutcome::NoOp(_) => "noop",
    }
}
