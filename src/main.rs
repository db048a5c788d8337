mod api;
mod blockchain;
mod config;
mod consensus;
mod error;
mod mining;
mod network;
mod node;
mod transaction;

use actix_web::{App, HttpServer, rt, web};
use dotenvy::dotenv;
use log::info;

use api::Engine;
use config::NodeConfig;
use network::HttpTransport;
use node::Node;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env();
    info!(
        "⛓️ Starting ledger node at http://{}:{} (difficulty={})",
        config.host, config.port, config.difficulty
    );

    let node = web::Data::new(Node::new(config.difficulty));
    for peer in &config.peers {
        node.register_peer(peer);
    }

    if config.advertise.is_some() && !config.peers.is_empty() {
        let node = node.clone();
        let engine = Engine::new(HttpTransport::new(config.peer_timeout), config.peer_timeout)
            .advertising(config.advertise.clone());
        rt::spawn(async move {
            for peer in node.peers() {
                engine.announce(&peer).await;
            }
        });
    }

    if let Some(period) = config.sync_interval {
        let node = node.clone();
        let peer_timeout = config.peer_timeout;
        rt::spawn(async move {
            let engine = Engine::new(HttpTransport::new(peer_timeout), peer_timeout);
            let mut ticker = rt::time::interval(period);
            loop {
                ticker.tick().await;
                if !node.has_peers() {
                    continue;
                }
                if engine.resolve(&node).await {
                    info!("background sync replaced the chain ({} blocks)", node.chain_len());
                }
            }
        });
    }

    let peer_timeout = config.peer_timeout;
    let advertise = config.advertise.clone();
    HttpServer::new(move || {
        let engine = Engine::new(HttpTransport::new(peer_timeout), peer_timeout)
            .advertising(advertise.clone());
        App::new()
            .app_data(node.clone())
            .app_data(web::Data::new(engine))
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
