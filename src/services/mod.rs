//! Business logic services

pub mod catalog;
pub mod fines;
pub mod identity;
pub mod lending;
pub mod reservations;
pub mod sweeper;

use std::sync::Arc;

use crate::{config::LendingConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub reservations: reservations::ReservationsService,
    pub lending: lending::LendingService,
}

impl Services {
    /// Wire all services over the shared repository and collaborators
    pub fn new(
        repository: Repository,
        identity: Arc<dyn identity::IdentityService>,
        fines: Arc<dyn fines::FineLedger>,
        lending_config: LendingConfig,
    ) -> Self {
        let lending_config = Arc::new(lending_config);
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            reservations: reservations::ReservationsService::new(
                repository.clone(),
                identity.clone(),
                lending_config.clone(),
            ),
            lending: lending::LendingService::new(repository, identity, fines, lending_config),
        }
    }
}
