use dotenvy::dotenv;
use tracing::info;

use webwizard::infra::{
    app::create_app,
    setup::{init_app_state, init_tracing},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let mut args = std::env::args();
    if args.nth(1).as_deref() == Some("renew-subscriptions") {
        return renew_subscriptions().await;
    }

    let app_state = init_app_state().await?;

    let bind_addr = app_state.config.bind_addr;

    let app = create_app(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// One renewal sweep, invoked by the operator (typically from cron).
async fn renew_subscriptions() -> anyhow::Result<()> {
    init_tracing();
    let app_state = init_app_state().await?;

    let report = app_state.subscription_use_cases.renew_expiring().await?;

    println!("Renewed {} subscription(s)", report.renewed.len());
    for (user_id, reason) in &report.failed {
        eprintln!("Failed to renew for user {}: {}", user_id, reason);
    }
    Ok(())
}
