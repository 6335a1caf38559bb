#[macro_use]
extern crate rocket;

use std::sync::Arc;

use backend::Backend;
use config::AppConfig;
use gateway::PeerGateway;
use indexer::{Indexer, IndexerSignal};
use rocket::{
    fairing::{Fairing, Info, Kind},
    Build, Orbit, Rocket,
};
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

pub mod api;
pub mod backend;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod headers;
pub mod indexer;
#[cfg(test)]
mod memory;
pub mod objects;
pub mod peer;
pub mod search;
pub mod service;
pub mod store;

/// Build the peer service on top of an opened backend.
pub fn peduc_rocket(config: AppConfig, backend: Backend) -> Rocket<Build> {
    let store = Arc::new(backend.peer_store());
    let index = Arc::new(backend.peer_index());
    let gateway = PeerGateway::new(store, index, &config.peduc);
    let indexer = Indexer::new(backend.peer_index(), config.peduc.indexer_report_secs);
    let base = config.peduc.base_path.clone();
    let doc = api::api_doc(config.peduc.location_base());

    rocket::build()
        .configure(&config.rocket)
        .attach(IndexerFairing {
            reindex_on_startup: config.peduc.reindex_on_startup,
        })
        .manage(config)
        .manage(backend)
        .manage(gateway)
        .manage(indexer)
        .mount("/", Scalar::with_url("/scalar", doc.clone()))
        .mount(
            "/",
            SwaggerUi::new("/swagger-ui/<_..>").url("/api-docs/openapi.json", doc),
        )
        .mount("/management", routes![api::backend_status])
        .mount(
            base,
            routes![
                api::peers::create_peer,
                api::peers::update_peer,
                api::peers::get_all_peers,
                api::peers::get_peer,
                api::peers::delete_peer,
                api::peers::search_peers,
                api::reindex_peers,
            ],
        )
        .register(
            "/",
            catchers![
                api::catchers::bad_request,
                api::catchers::not_found,
                api::catchers::unprocessable,
                api::catchers::default,
            ],
        )
}

/// Runs the indexer for as long as Rocket is in orbit.
pub struct IndexerFairing {
    reindex_on_startup: bool,
}

#[rocket::async_trait]
impl Fairing for IndexerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Search indexer",
            kind: Kind::Liftoff | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, r: &Rocket<Orbit>) {
        let indexer = match r.state::<Indexer>() {
            Some(indexer) => indexer.clone(),
            None => {
                log::warn!("Couldn't find indexer on liftoff!");
                return;
            }
        };
        if self.reindex_on_startup {
            if let Err(e) = indexer.signal(IndexerSignal::Reindex) {
                log::error!("Failed to queue startup reindex {e}");
            }
        }
        tokio::task::spawn(async move {
            match indexer.run().await {
                Ok(_) => log::info!("indexer exited"),
                Err(e) => log::error!("indexer error {e}"),
            }
        });
    }

    async fn on_shutdown(&self, r: &Rocket<Orbit>) {
        log::info!("Shutting down, stopping the indexer");
        match r.state::<Indexer>() {
            Some(indexer) => {
                if let Err(e) = indexer.signal(IndexerSignal::Shutdown) {
                    log::error!("Failed to signal the indexer {e}");
                }
            }
            None => log::warn!("Couldn't find indexer on shutdown!"),
        }
        match r.state::<Backend>() {
            Some(backend) => match backend.flush() {
                Ok(n) => log::info!("flushed {n} bytes"),
                Err(e) => log::error!("Failed to flush the backend {e}"),
            },
            None => log::warn!("Couldn't find backend on shutdown!"),
        }
    }
}
