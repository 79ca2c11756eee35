// src/env.rs

//! Child environment assembly.
//!
//! The child gets exactly the list built here: the inherited environment,
//! then `gorun.yaml` extras, then the five Apollo entries in a fixed order.
//! Later entries win when a key repeats.

use std::ffi::OsString;

use crate::settings::Settings;

pub const APOLLO_IP: &str = "APOLLO_IP";
pub const APOLLO_ENV: &str = "APOLLO_ENV";
pub const APOLLO_APPID: &str = "APOLLO_APPID";
pub const APOLLO_ACCESSKEY: &str = "APOLLO_ACCESSKEY";
pub const REGISTRY: &str = "registry";

pub type EnvSet = Vec<(OsString, OsString)>;

/// The five derived entries, in the order they are appended.
pub fn derived_entries(settings: &Settings) -> [(&'static str, &str); 5] {
    [
        (APOLLO_IP, settings.apollo_ip.as_str()),
        (APOLLO_ENV, settings.cluster.as_str()),
        (APOLLO_APPID, settings.app_id.as_str()),
        (APOLLO_ACCESSKEY, settings.key.as_str()),
        (REGISTRY, settings.registry.as_str()),
    ]
}

/// Build the child's environment from a snapshot of the parent's.
///
/// `base` is consumed as given; nothing is removed or reordered.
pub fn assemble_env<I, K, V>(base: I, settings: &Settings) -> EnvSet
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<OsString>,
    V: Into<OsString>,
{
    let mut env: EnvSet = base
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();

    env.extend(
        settings
            .extra_env
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v))),
    );

    env.extend(
        derived_entries(settings)
            .into_iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v))),
    );

    env
}
