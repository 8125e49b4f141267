use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

use crate::packaging::descriptor::PackageDescriptor;

/// Error that can occur when resolving the package load order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    /// A package depends on a name that is absent or disabled
    #[error("Package '{package}' depends on '{dependency}', which is not an enabled package")]
    UnknownDependency { package: String, dependency: String },

    /// Dependency cycle detected; the first name is repeated at the end
    #[error("Circular dependency detected: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),

    /// Two descriptors share a name
    #[error("Package '{0}' is declared more than once")]
    DuplicatePackage(String),
}

/// Directed graph over enabled packages; an edge `A -> B` means A depends on B.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Build the graph of the enabled descriptors, rejecting duplicate names
    /// and dependencies that are not enabled packages.
    pub fn build(descriptors: &[PackageDescriptor]) -> Result<Self, DependencyError> {
        let mut seen = BTreeSet::new();
        for descriptor in descriptors {
            if !seen.insert(descriptor.name()) {
                return Err(DependencyError::DuplicatePackage(descriptor.name().to_string()));
            }
        }

        let edges: BTreeMap<String, Vec<String>> = descriptors
            .iter()
            .filter(|d| d.is_enabled())
            .map(|d| (d.name().to_string(), d.depends().to_vec()))
            .collect();

        for (package, depends) in &edges {
            for dependency in depends {
                if edges.contains_key(dependency) {
                    continue;
                }
                if seen.contains(dependency.as_str()) {
                    log::warn!(
                        "Package '{}' depends on '{}', which is disabled",
                        package,
                        dependency
                    );
                }
                return Err(DependencyError::UnknownDependency {
                    package: package.clone(),
                    dependency: dependency.clone(),
                });
            }
        }

        Ok(Self { edges })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.edges.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Direct dependencies of `name`, in declaration order
    pub fn dependencies_of(&self, name: &str) -> &[String] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Packages that depend directly on `name`, sorted
    pub fn dependents_of(&self, name: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, depends)| depends.iter().any(|d| d == name))
            .map(|(package, _)| package.as_str())
            .collect()
    }

    /// Kahn's algorithm. Among packages whose dependencies are all placed,
    /// the lexicographically smallest name goes first.
    pub fn topological_order(&self) -> Result<Vec<String>, DependencyError> {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for (package, depends) in &self.edges {
            in_degree.insert(package.as_str(), depends.len());
            for dependency in depends {
                dependents.entry(dependency.as_str()).or_default().push(package.as_str());
            }
        }

        let mut ready: BTreeSet<&str> = in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(name, _)| *name)
            .collect();

        let mut order = Vec::with_capacity(self.edges.len());
        while let Some(next) = ready.pop_first() {
            order.push(next.to_string());
            for dependent in dependents.get(next).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if order.len() < self.edges.len() {
            let placed: BTreeSet<&str> = order.iter().map(String::as_str).collect();
            return Err(DependencyError::CyclicDependency(self.find_cycle(&placed)));
        }
        Ok(order)
    }

    /// Walk unplaced packages along their smallest unplaced dependency until a
    /// name repeats. Every unplaced package has at least one unplaced
    /// dependency, so the walk always closes a cycle.
    fn find_cycle(&self, placed: &BTreeSet<&str>) -> Vec<String> {
        let Some(start) = self.edges.keys().find(|name| !placed.contains(name.as_str())) else {
            return Vec::new();
        };

        let mut path: Vec<&str> = Vec::new();
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut current = start.as_str();
        loop {
            if let Some(&index) = position.get(current) {
                let mut cycle: Vec<String> = path[index..].iter().map(|name| name.to_string()).collect();
                cycle.push(current.to_string());
                return cycle;
            }
            position.insert(current, path.len());
            path.push(current);

            let next = self
                .dependencies_of(current)
                .iter()
                .map(String::as_str)
                .filter(|d| !placed.contains(d))
                .min();
            match next {
                Some(next) => current = next,
                None => return path.iter().map(|name| name.to_string()).collect(),
            }
        }
    }
}

/// Produce the load order of the enabled descriptors.
///
/// Every dependency comes before its dependents, and the result depends only
/// on the input set, not on its order. Nothing is returned on failure.
pub fn resolve(descriptors: &[PackageDescriptor]) -> Result<Vec<PackageDescriptor>, DependencyError> {
    let graph = DependencyGraph::build(descriptors)?;
    let order = graph.topological_order()?;

    let by_name: HashMap<&str, &PackageDescriptor> =
        descriptors.iter().map(|d| (d.name(), d)).collect();
    Ok(order
        .iter()
        .filter_map(|name| by_name.get(name.as_str()).map(|d| (*d).clone()))
        .collect())
}
