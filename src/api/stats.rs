use actix_web::{HttpResponse, Responder, get, web};

use crate::node::Node;

/// Height, difficulty, tip and pool/peer sizes.
#[get("/stats/")]
pub async fn get_stats(node: web::Data<Node>) -> impl Responder {
    HttpResponse::Ok().json(node.stats())
}
