use anyhow::Result;
use osdsync::{
    Config, Context, DashboardsClient, DeclaredObject, OsEnv, SavedObject, DEFAULT_INDEX_PATTERN_ID,
};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Read OS_BASE_URL, AWS_REGION and the AWS credentials from the environment
    let ctx = Context::new().with_env(OsEnv);
    let config = Config::default().from_env(&ctx);
    let ctx = ctx.with_http_send(config.http_send()?);

    let client = DashboardsClient::new(ctx, config)?;

    // Desired state, as it would come from a declarative description
    let desired = DeclaredObject {
        object_type: "search".to_string(),
        id: "osdsync-example".to_string(),
        attributes: r#"{"title": "Sales", "columns": ["_source"]}"#.to_string(),
        references: vec![],
    };
    let obj = SavedObject::try_from(desired)?;

    match client.saved_objects().get(&obj.object_type, &obj.id).await? {
        Some(current) => println!("current attributes: {}", current.attributes),
        None => println!("{}/{} does not exist yet", obj.object_type, obj.id),
    }

    client.saved_objects().save(&obj).await?;
    println!("saved {}/{}", obj.object_type, obj.id);

    let default = client.default_index_pattern().get().await?;
    println!("{DEFAULT_INDEX_PATTERN_ID}: {default:?}");

    Ok(())
}
