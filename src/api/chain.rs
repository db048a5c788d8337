use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{
    ChainResponse, Engine, MineRequest, MineResponse, ReceiveBlockResponse, ValidateResponse,
};
use crate::blockchain::Block;
use crate::error::MineError;
use crate::node::Node;

/// Get the full blockchain.
#[get("/chain/")]
pub async fn get_chain(node: web::Data<Node>) -> impl Responder {
    let chain = node.get_chain();
    HttpResponse::Ok().json(ChainResponse {
        length: chain.len(),
        difficulty: node.difficulty(),
        chain,
    })
}

/// Validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(node: web::Data<Node>) -> impl Responder {
    HttpResponse::Ok().json(ValidateResponse {
        valid: node.validate(),
        length: node.chain_len(),
        difficulty: node.difficulty(),
    })
}

/// Mine every pending transaction into a new block:
/// - PoW runs on the blocking pool, no lock held during the search
/// - the sealed block is appended and the reward queued for next round
/// - the block is then pushed to every known peer
#[post("/mine/")]
pub async fn mine_block(
    node: web::Data<Node>,
    engine: web::Data<Engine>,
    req: web::Json<MineRequest>,
) -> impl Responder {
    let miner_address = req.miner_address.trim().to_string();
    if miner_address.is_empty() {
        return HttpResponse::BadRequest().body("miner_address required");
    }
    if !node.has_pending() {
        return HttpResponse::BadRequest().body("no transactions to mine");
    }

    let worker = node.clone();
    let block = match web::block(move || worker.mine_next(&miner_address)).await {
        Ok(Ok(block)) => block,
        Ok(Err(MineError::NothingToMine)) => {
            return HttpResponse::BadRequest().body("no transactions to mine");
        }
        Ok(Err(e @ (MineError::Cancelled | MineError::Stale(_)))) => {
            return HttpResponse::Conflict().body(e.to_string());
        }
        Ok(Err(e)) => {
            warn!("POST /mine/ - {e}");
            return HttpResponse::InternalServerError().body(e.to_string());
        }
        Err(e) => {
            warn!("POST /mine/ - mining worker failed: {e}");
            return HttpResponse::InternalServerError().body("mining worker failed");
        }
    };

    let delivered_to = engine.broadcast(&block, &node.peers()).await;
    info!(
        "POST /mine/ - block #{} sealed, broadcast to {delivered_to} peers",
        block.index
    );
    HttpResponse::Ok().json(MineResponse {
        message: "Block mined".to_string(),
        block,
        delivered_to,
    })
}

/// Abandon an in-flight mining attempt; its transactions go back to the pool.
#[post("/mine/cancel/")]
pub async fn cancel_mining(node: web::Data<Node>) -> impl Responder {
    node.cancel_mining();
    HttpResponse::Accepted().finish()
}

/// A peer pushes a block it mined.
#[post("/blocks/")]
pub async fn receive_block(
    node: web::Data<Node>,
    engine: web::Data<Engine>,
    block: web::Json<Block>,
) -> impl Responder {
    let outcome = engine.receive_block(&node, block.into_inner()).await;
    let resp = ReceiveBlockResponse {
        accepted: outcome.is_accepted(),
        outcome,
        length: node.chain_len(),
    };
    if resp.accepted {
        HttpResponse::Ok().json(resp)
    } else {
        HttpResponse::BadRequest().json(resp)
    }
}
