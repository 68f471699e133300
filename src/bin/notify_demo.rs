//! Demo that pushes a few sample findings through the configured notifier
//! (console when no webhook is set). Handy for checking webhook wiring.

use radiantic_client::notify::NEW_RESEARCH_TITLE;
use radiantic_client::{ClientConfig, Dispatcher, Permission};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().with_target(false).init();

    let cfg = ClientConfig::load()?;
    let dispatcher = Dispatcher::new(cfg.build_notifier(cfg.notify_permission));

    if dispatcher.permission() != Permission::Granted {
        let perm = dispatcher.request_permission().await;
        println!("permission: {perm}");
    }

    let samples = [
        "AI just got a memory upgrade. This new technique lets findings stick forever.",
        "Robots learned to fold laundry by watching videos - and they're getting good.",
        "A tiny model beat a giant one at math. The trick? Thinking out loud.",
    ];

    for body in samples {
        let sent = dispatcher.dispatch(NEW_RESEARCH_TITLE, body).await;
        tracing::info!(sent, "demo notification");
        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
    }

    println!("notify-demo done");
    Ok(())
}
