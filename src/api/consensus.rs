use actix_web::{HttpResponse, Responder, post, web};
use log::debug;

use super::models::{ProducerRequest, ProducerResponse};
use crate::consensus::select_producer;

/// Stake-weighted pick of the next block producer among the given nodes.
#[post("/consensus/producer/")]
pub async fn pick_producer(body: web::Json<ProducerRequest>) -> impl Responder {
    let stakes: Vec<(String, u64)> = body
        .stakes
        .iter()
        .map(|entry| (entry.node.clone(), entry.stake))
        .collect();
    let total_stake = stakes.iter().map(|(_, s)| *s).fold(0, u64::saturating_add);

    let producer = select_producer(&stakes, &mut rand::thread_rng()).map(str::to_string);
    debug!("POST /consensus/producer/ - {producer:?} out of {} nodes", stakes.len());

    HttpResponse::Ok().json(ProducerResponse {
        producer,
        total_stake,
    })
}
