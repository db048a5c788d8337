use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, warn};

use super::models::{Engine, MempoolResponse, NewTxRequest, NewTxResponse};
use crate::node::Node;
use crate::transaction::Transaction;

/// Queue a transaction for the next block. No balance or signature checks.
/// Client submissions are relayed to every known peer; relayed ones stop here.
#[post("/tx/")]
pub async fn post_transaction(
    node: web::Data<Node>,
    engine: web::Data<Engine>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let sender = body.sender.trim();
    let recipient = body.recipient.trim();
    if sender.is_empty() || recipient.is_empty() {
        warn!("POST /tx/ - rejected: missing sender or recipient");
        return HttpResponse::BadRequest().body("sender and recipient required");
    }

    let submission = node.submit_transaction(sender, recipient, body.amount);
    debug!(
        "POST /tx/ - {sender} -> {recipient} ({}) queued at {}",
        body.amount, submission.position
    );

    let relayed_to = if body.relayed {
        0
    } else {
        let tx = Transaction::new(sender, recipient, body.amount);
        engine.broadcast_transaction(&tx, &node.peers()).await
    };

    HttpResponse::Created().json(NewTxResponse {
        message: format!(
            "Transaction will be added to Block {}",
            submission.block_index
        ),
        position: submission.position,
        block_index: submission.block_index,
        relayed_to,
    })
}

/// List the pending pool.
#[get("/mempool/")]
pub async fn get_mempool(node: web::Data<Node>) -> impl Responder {
    let transactions = node.pending_transactions();
    HttpResponse::Ok().json(MempoolResponse {
        size: transactions.len(),
        transactions,
    })
}
