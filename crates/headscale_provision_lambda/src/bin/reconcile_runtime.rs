use headscale_provision_core::contract::ResponseDocument;
use headscale_provision_lambda::adapters::aws_clients::ProviderClients;
use headscale_provision_lambda::adapters::http_callback::HttpCallbackTransport;
use headscale_provision_lambda::config::RuntimeConfig;
use headscale_provision_lambda::runtime::{
    handle_invocation, init_logging, invocation_context, ProviderAdapters,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;

async fn handle_request(event: LambdaEvent<Value>) -> Result<ResponseDocument, Error> {
    // Resolved per request; a bad value is reported on the event, not raised.
    let config = RuntimeConfig::from_env();
    let context = invocation_context(&event.context);

    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let clients = ProviderClients::from_conf(&aws_config);
    let inventory = clients.inventory();
    let zones = clients.zone_directory();
    let store = clients.parameter_store();
    let transport = HttpCallbackTransport::default();

    handle_invocation(
        event.payload,
        &context,
        config.as_ref(),
        ProviderAdapters {
            inventory: &inventory,
            zones: &zones,
            store: &store,
        },
        &transport,
    )
    .map_err(|error| Error::from(error.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();
    lambda_runtime::run(service_fn(handle_request)).await
}
