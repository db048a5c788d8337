mod chain;
mod consensus;
mod health;
pub mod models;
mod peers;
mod stats;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use models::Engine;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(chain::mine_block)
            .service(chain::cancel_mining)
            .service(chain::receive_block)
            .service(tx::post_transaction)
            .service(tx::get_mempool)
            .service(peers::list_peers)
            .service(peers::register_peer)
            .service(peers::resolve)
            .service(consensus::pick_producer)
            .service(stats::get_stats),
    );
}
