use clap::Parser;
use miette::{IntoDiagnostic, Result};
use order_webhooks::application::registrar::Registrar;
use order_webhooks::config::{
    Cli, Command, ImportOrdersArgs, LogFormat, RegisterArgs, ServeArgs, UnregisterArgs,
};
use order_webhooks::domain::ports::EventLogRef;
use order_webhooks::infrastructure::store::OrderStore;
use order_webhooks::infrastructure::tracing_log::TracingEventLog;
use order_webhooks::interfaces::csv::order_reader::OrderReader;
use order_webhooks::interfaces::csv::order_writer::OrderWriter;
use order_webhooks::interfaces::http::{AppState, start_server};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Register(args) => register(args).await,
        Command::Unregister(args) => unregister(args).await,
        Command::ImportOrders(args) => import_orders(args).await,
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Loads orders from `path` into `store`. Malformed rows are skipped.
async fn load_orders(store: &OrderStore, path: &Path) -> Result<usize> {
    let file = File::open(path).into_diagnostic()?;
    let mut loaded = 0;
    for order in OrderReader::new(file).orders() {
        match order {
            Ok(order) => {
                store.insert(order).await.into_diagnostic()?;
                loaded += 1;
            }
            Err(e) => {
                warn!("Error reading order: {}", e);
            }
        }
    }
    Ok(loaded)
}

async fn serve(args: ServeArgs) -> Result<()> {
    args.validate().into_diagnostic()?;
    let store = OrderStore::open(args.storage.db_path.as_deref()).into_diagnostic()?;
    if let Some(path) = &args.orders {
        let loaded = load_orders(&store, path).await?;
        info!(loaded, path = %path.display(), "Orders loaded");
    }

    let log: EventLogRef = Arc::new(TracingEventLog);
    let dispatcher = Arc::new(Registrar::dispatcher(
        store.service(),
        log,
        args.dispatch_policy(),
    ));
    info!(handlers = dispatcher.handlers().len(), "Webhook handlers registered");

    match (&args.public_url, args.provider.subscriber().into_diagnostic()?) {
        (Some(public_url), Some(subscriber)) => {
            let registrar = Registrar::new(Arc::new(subscriber));
            // Deliveries to an existing subscription still arrive, so keep serving.
            if let Err(e) = registrar.register(public_url, &dispatcher).await {
                error!("Webhook registration failed: {}", e);
            }
        }
        (Some(_), None) => {
            warn!("Public URL configured without PayPal credentials; skipping webhook registration")
        }
        (None, _) => info!("No public URL configured; skipping webhook registration"),
    }

    let state = AppState::new(dispatcher).with_failure_status(args.failure_status.into());
    start_server(state, args.bind, args.request_timeout())
        .await
        .into_diagnostic()?;

    Ok(())
}

async fn register(args: RegisterArgs) -> Result<()> {
    let subscriber = args.provider.require_subscriber().into_diagnostic()?;
    let dispatcher = Registrar::dispatcher(
        OrderStore::open(None).into_diagnostic()?.service(),
        Arc::new(TracingEventLog),
        Default::default(),
    );

    let subscription = Registrar::new(Arc::new(subscriber))
        .register(&args.public_url, &dispatcher)
        .await
        .into_diagnostic()?;

    println!("{}", subscription.id);
    Ok(())
}

async fn unregister(args: UnregisterArgs) -> Result<()> {
    let subscriber = args.provider.require_subscriber().into_diagnostic()?;
    Registrar::new(Arc::new(subscriber))
        .unregister(&args.webhook_id)
        .await
        .into_diagnostic()?;
    Ok(())
}

async fn import_orders(args: ImportOrdersArgs) -> Result<()> {
    let store = OrderStore::open(args.storage.db_path.as_deref()).into_diagnostic()?;
    let loaded = load_orders(&store, &args.input).await?;
    info!(loaded, "Orders imported");

    let orders = store.all().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = OrderWriter::new(stdout.lock());
    writer.write_orders(orders).into_diagnostic()?;

    Ok(())
}
