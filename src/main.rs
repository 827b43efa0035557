use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use pbft_client::{
    app::KvStore,
    model::event_channel,
    net::serve_inbox,
    router::router_loop,
    task::BackgroundMonitor,
    unreplicated::{run_replica, Replica},
    Client, Config, ReplicaId, TcpLink, TimestampCounter,
};
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(about = "Client for a PBFT replicated key-value store")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run operations such as `put:key:value` against the cluster, in order.
    Client {
        #[arg(long)]
        config: PathBuf,
        ops: Vec<String>,
    },
    /// Run a non-replicated stand-in replica.
    Replica {
        #[arg(long)]
        listen: SocketAddr,
        #[arg(long, default_value_t = 0)]
        view: u64,
        #[arg(long)]
        inbox: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> pbft_client::Result<()> {
    tracing_subscriber::fmt::init();
    match Cli::parse().command {
        Command::Client { config, ops } => run_client(Config::load(config)?, ops).await,
        Command::Replica {
            listen,
            view,
            inbox,
        } => {
            let replica = Replica {
                id: ReplicaId::from(listen),
                view_num: view,
                inbox,
            };
            let mut monitor = BackgroundMonitor::default();
            monitor
                .spawner()
                .spawn(run_replica(replica, KvStore::default(), TcpListener::bind(listen).await?));
            tokio::select! {
                result = monitor.wait() => result,
                result = tokio::signal::ctrl_c() => {
                    monitor.cancel();
                    Ok(result?)
                }
            }
        }
    }
}

async fn run_client(config: Config, ops: Vec<String>) -> pbft_client::Result<()> {
    let cluster = config.cluster()?;
    let links = TcpLink::for_cluster(&cluster)?;
    let mut client = Client::new(
        config.client_id.clone(),
        cluster,
        links,
        Arc::new(TimestampCounter::new()),
    )?;
    let mut monitor = BackgroundMonitor::default();
    let spawner = monitor.spawner();
    if let Some(inbox) = config.inbox {
        let (router, source) = event_channel();
        spawner.spawn(router_loop(source));
        spawner.spawn(serve_inbox(TcpListener::bind(inbox).await?, router.clone()));
        client = client.with_inbox(router);
    }
    let client = Arc::new(client);
    spawner.spawn({
        let client = client.clone();
        async move {
            tokio::signal::ctrl_c().await?;
            client.shutdown();
            Ok(())
        }
    });

    let run = async {
        for op in ops {
            let result = client.invoke(op.clone()).await?;
            println!("{op} => {}", String::from_utf8_lossy(&result));
        }
        pbft_client::Result::<()>::Ok(())
    };
    let result = tokio::select! {
        result = run => result,
        result = monitor.wait() => result,
    };
    monitor.cancel();
    result
}
