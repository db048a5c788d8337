use actix_web::{HttpResponse, Responder, get, post, web};
use log::info;

use super::models::{Engine, PeersResponse, RegisterPeerRequest, ResolveResponse};
use crate::node::Node;

#[get("/peers/")]
pub async fn list_peers(node: web::Data<Node>) -> impl Responder {
    HttpResponse::Ok().json(PeersResponse {
        added: None,
        announced: None,
        peers: node.peers(),
    })
}

/// Register a peer. A client-added peer is told our address in return; a
/// peer announcing itself is not.
#[post("/peers/")]
pub async fn register_peer(
    node: web::Data<Node>,
    engine: web::Data<Engine>,
    body: web::Json<RegisterPeerRequest>,
) -> impl Responder {
    if body.address.trim().is_empty() {
        return HttpResponse::BadRequest().body("address required");
    }
    let added = node.register_peer(&body.address);
    let announced = added && !body.relayed && engine.announce(body.address.trim()).await;
    HttpResponse::Ok().json(PeersResponse {
        added: Some(added),
        announced: Some(announced),
        peers: node.peers(),
    })
}

/// Run conflict resolution against every known peer.
#[post("/resolve/")]
pub async fn resolve(node: web::Data<Node>, engine: web::Data<Engine>) -> impl Responder {
    let replaced = engine.resolve(&node).await;
    let length = node.chain_len();
    if replaced {
        info!("POST /resolve/ - chain replaced, now {length} blocks");
    }
    HttpResponse::Ok().json(ResolveResponse { replaced, length })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::{App, test, web};
    use serde_json::{Value, json};

    use super::*;
    use crate::network::HttpTransport;

    #[actix_web::test]
    async fn register_then_resolve_with_unreachable_peer() {
        let node = web::Data::new(Node::new(1));
        let engine = web::Data::new(Engine::new(
            HttpTransport::new(Duration::from_millis(200)),
            Duration::from_millis(200),
        ));
        let app = test::init_service(
            App::new()
                .app_data(node.clone())
                .app_data(engine)
                .service(list_peers)
                .service(register_peer)
                .service(resolve),
        )
        .await;

        for expected in [true, false] {
            let req = test::TestRequest::post()
                .uri("/peers/")
                .set_json(json!({ "address": "127.0.0.1:9" }))
                .to_request();
            let body: Value = test::call_and_read_body_json(&app, req).await;
            assert_eq!(body["added"], expected);
            assert_eq!(body["announced"], false);
        }

        let req = test::TestRequest::get().uri("/peers/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["peers"], json!(["127.0.0.1:9"]));

        let req = test::TestRequest::post().uri("/resolve/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["replaced"], false);
        assert_eq!(body["length"], 1);
    }

    #[actix_web::test]
    async fn unreachable_peer_is_kept_when_announce_fails() {
        let node = web::Data::new(Node::new(1));
        let engine = web::Data::new(
            Engine::new(
                HttpTransport::new(Duration::from_millis(200)),
                Duration::from_millis(200),
            )
            .advertising(Some("127.0.0.1:5001".to_string())),
        );
        let app = test::init_service(
            App::new()
                .app_data(node.clone())
                .app_data(engine)
                .service(register_peer),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/peers/")
            .set_json(json!({ "address": "127.0.0.1:9" }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["added"], true);
        assert_eq!(body["announced"], false);
        assert_eq!(node.peers(), vec!["127.0.0.1:9".to_string()]);
    }
}
