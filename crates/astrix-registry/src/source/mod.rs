//! Requirement lookup seam between the registry and the conflict detector

use std::future::Future;

use astrix_core::types::Requirement;

use crate::{RegistryClient, RegistryResult};

/// Anything that can report the requirements a package declares.
///
/// Errors are treated by callers as "no requirements discoverable".
pub trait RequirementSource {
    fn fetch_requirements(
        &self,
        package: &str,
        version: Option<&str>,
    ) -> impl Future<Output = RegistryResult<Vec<Requirement>>> + Send;
}

impl RequirementSource for RegistryClient {
    fn fetch_requirements(
        &self,
        package: &str,
        version: Option<&str>,
    ) -> impl Future<Output = RegistryResult<Vec<Requirement>>> + Send {
        RegistryClient::fetch_requirements(self, package, version)
    }
}
