//! Selection of (distribution, packager) pairs.
//!
//! Distributions are visited in declared order, packagers in type order.
//! Only enabled entities are returned; validation already resolved every
//! enabled flag.

use super::context::Filters;
use crate::release::{
    error::{Error, Result},
    settings::{Distribution, Model, Packager, PackagerType},
};
use std::str::FromStr;

/// One selected distribution and its packagers to process.
#[derive(Debug)]
pub struct Selection<'a> {
    pub distribution: &'a Distribution,
    pub packagers: Vec<&'a Packager>,
}

/// Resolves the distributions named by the include filter, or every enabled
/// distribution minus the excluded ones.
///
/// An included distribution that doesn't exist aborts the whole run.
pub fn select_distributions<'a>(model: &'a Model, filters: &Filters) -> Result<Vec<&'a Distribution>> {
    if !filters.distributions.is_empty() {
        let mut selected = Vec::new();
        for name in &filters.distributions {
            let distribution = model
                .distribution(name)
                .ok_or_else(|| Error::config(format!("distribution {} is not defined", name)))?;
            if distribution.is_enabled() {
                selected.push(distribution);
            } else {
                log::info!("distribution {} is disabled, skipping", name);
            }
        }
        return Ok(selected);
    }

    Ok(model
        .distributions
        .iter()
        .filter(|d| d.is_enabled())
        .filter(|d| {
            let excluded = filters.exclude_distributions.contains(&d.name);
            if excluded {
                log::info!("distribution {} is excluded", d.name);
            }
            !excluded
        })
        .collect())
}

/// Parses packager names, warning about the ones nobody supports.
fn packager_types(names: &[String]) -> Vec<PackagerType> {
    names
        .iter()
        .filter_map(|name| match PackagerType::from_str(name) {
            Ok(packager_type) => Some(packager_type),
            Err(e) => {
                log::warn!("{}, ignoring", e);
                None
            }
        })
        .collect()
}

/// Packagers of `distribution` selected by the packager filters.
pub fn select_packagers<'a>(distribution: &'a Distribution, filters: &Filters) -> Vec<&'a Packager> {
    let candidates: Vec<PackagerType> = if filters.packagers.is_empty() {
        let excluded = packager_types(&filters.exclude_packagers);
        PackagerType::ALL
            .into_iter()
            .filter(|t| !excluded.contains(t))
            .collect()
    } else {
        packager_types(&filters.packagers)
    };

    candidates
        .into_iter()
        .filter_map(|packager_type| distribution.packagers.get(packager_type))
        .filter(|packager| packager.supports_distribution(distribution.distribution_type))
        .filter(|packager| {
            if !packager.is_enabled() {
                log::debug!(
                    "{} is disabled for distribution {}",
                    packager.name(),
                    distribution.name
                );
            }
            packager.is_enabled()
        })
        .collect()
}

/// Distributions and their packagers, both filtered.
pub fn select<'a>(model: &'a Model, filters: &Filters) -> Result<Vec<Selection<'a>>> {
    Ok(select_distributions(model, filters)?
        .into_iter()
        .map(|distribution| Selection {
            distribution,
            packagers: select_packagers(distribution, filters),
        })
        .collect())
}
