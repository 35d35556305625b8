use fxhash::FxHashMap;

use crate::{
    error::DispatchError,
    problem::package::{Package, PackageId},
};

/// Packages keyed by id. Iteration always follows ascending id order.
#[derive(Debug, Clone, Default)]
pub struct PackageStore {
    packages: FxHashMap<PackageId, Package>,
    ids: Vec<PackageId>,
}

impl PackageStore {
    pub fn new() -> Self {
        PackageStore::default()
    }

    pub fn insert(&mut self, package: Package) -> Result<(), DispatchError> {
        let id = package.id();
        if self.packages.contains_key(&id) {
            return Err(DispatchError::DuplicatePackage(id));
        }

        let position = self.ids.partition_point(|&other| other < id);
        self.ids.insert(position, id);
        self.packages.insert(id, package);

        Ok(())
    }

    pub fn get(&self, id: PackageId) -> Result<&Package, DispatchError> {
        self.packages
            .get(&id)
            .ok_or(DispatchError::PackageNotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: PackageId) -> Result<&mut Package, DispatchError> {
        self.packages
            .get_mut(&id)
            .ok_or(DispatchError::PackageNotFound(id))
    }

    pub fn contains(&self, id: PackageId) -> bool {
        self.packages.contains_key(&id)
    }

    pub fn ids(&self) -> &[PackageId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.ids.iter().map(|id| &self.packages[id])
    }

    pub fn undelivered(&self) -> Vec<PackageId> {
        self.iter()
            .filter(|package| !package.is_delivered())
            .map(|package| package.id())
            .collect()
    }

    pub fn all_delivered(&self) -> bool {
        self.packages.values().all(Package::is_delivered)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
