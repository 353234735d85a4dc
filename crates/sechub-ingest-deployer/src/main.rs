//! sechub-ingest-deployer: Lambda backing the Security Hub ingest custom resource

use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use sechub_ingest_common::timestamp_millis;
use sechub_ingest_deployer::aws::{
    AwsContext, CloudFormationClient, FromAwsContext, OrganizationsClient,
};
use sechub_ingest_deployer::config::DeployerConfig;
use sechub_ingest_deployer::handler::{Deployer, remaining_until};
use sechub_ingest_deployer::lifecycle::{LifecycleController, Responder};
use sechub_ingest_deployer::logging;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    logging::init();

    let aws = AwsContext::load().await;
    info!(region = ?aws.region(), "Loaded AWS configuration");

    let config = DeployerConfig::from_env();
    if let Err(e) = &config {
        error!(error = %e, "Invalid configuration, every event will be answered FAILED");
    }

    let controller = LifecycleController::new(
        CloudFormationClient::from_context(&aws),
        OrganizationsClient::from_context(&aws),
    );
    let deployer = Deployer::new(controller, Responder::new()?, config);
    let deployer = &deployer;

    run(service_fn(
        move |event: LambdaEvent<serde_json::Value>| async move {
            let (payload, context) = event.into_parts();
            let remaining = remaining_until(context.deadline, timestamp_millis());
            deployer
                .handle(payload, &context.invoked_function_arn, Some(remaining))
                .await
                .map(|_| serde_json::Value::Null)
                .map_err(Error::from)
        },
    ))
    .await
}
