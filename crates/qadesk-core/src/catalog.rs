// SPDX-FileCopyrightText: 2026 Qadesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Selectable browsers, per-project environments and the
//! environment-to-database table.
//!
//! The built-in tables are used unless the `[catalog]` configuration section
//! replaces them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Project;

const BROWSERS: &[&str] = &[
    "Google Chrome",
    "Microsoft Edge",
    "Mozilla Firefox",
    "Apple Safari",
    "Opera Browser",
    "Brave Browser",
];

const GETNET_DATABASES: &[(&str, &str)] = &[
    ("Autorizador - GETNET EVO", "pays_getnet_evo_aas"),
    ("PayStudio - GETNET EVO", "pays_getnet_evo_bo"),
    ("Portal de Comercio - GETNET EVO", "pays_getnet_evo_pc"),
    ("Autorizador - GETNET FUTURE", "pays_getnet_future_aas"),
    ("PayStudio - GETNET FUTURE", "pays_getnet_future_bo"),
    ("Portal de Comercio - GETNET FUTURE", "pays_getnet_future_pc"),
    ("Autorizador - GETNET RELEASE", "pays_getnet_release_aas"),
    ("PayStudio - GETNET RELEASE", "pays_getnet_release_bo"),
    ("Portal de Comercio - GETNET RELEASE", "pays_getnet_release_pc"),
    ("Autorizador - GETNET HOTFIX", "pays_getnet_hotfix_aas"),
    ("PayStudio - GETNET HOTFIX", "pays_getnet_hotfix_bo"),
    ("Portal de Comercio - GETNET HOTFIX", "pays_getnet_hotfix_pc"),
    ("Autorizador - GETNET CERT", "singular_e4_aas"),
    ("PayStudio - GETNET CERT", "singular_e4_bo"),
    ("Portal de Comercio - GETNET CERT", "singular_e4_PortalC_ciclo4"),
    ("Autorizador - GETNET PREPROD", "pprod_cl_aas"),
    ("PayStudio - GETNET PREPROD", "pays_pprod_bo"),
    ("Portal de Comercio - GETNET PREPROD", "singular_pprd_portalc"),
    ("Autorizador - GETNET UAT", "pays_getnet_uat_aas"),
    ("PayStudio - GETNET UAT", "pays_getnet_uat_bo"),
    ("Portal de Comercio - GETNET UAT", "pays_getnet_uat_pc"),
];

const BPAGOS_DATABASES: &[(&str, &str)] = &[
    ("Autorizador - BPAGOS EVO", "pays_bpagos_evo_aas"),
    ("PayStudio - BPAGOS EVO", "pays_bpagos_evo_bo"),
    ("Portal de Comercio - BPAGOS EVO", "pays_bpagos_evo_pc"),
    ("Autorizador - BPAGOS FUTURE", "pays_bpagos_future_aas"),
    ("PayStudio - BPAGOS FUTURE", "pays_bpagos_future_bo"),
    ("Portal de Comercio - BPAGOS FUTURE", "pays_bpagos_future_pc"),
    ("Autorizador - BPAGOS RELEASE", "pays_bpagos_release_aas"),
    ("PayStudio - BPAGOS RELEASE", "pays_bpagos_release_bo"),
    ("Portal de Comercio - BPAGOS RELEASE", "pays_bpagos_release_pc"),
    ("Autorizador - BPAGOS HOTFIX", "pays_bpagos_hotfix_aas"),
    ("PayStudio - BPAGOS HOTFIX", "pays_bpagos_hotfix_bo"),
    ("Portal de Comercio - BPAGOS HOTFIX", "pays_bpagos_hotfix_pc"),
    ("Autorizador - BPAGOS CERT", "bchile_cert_aas"),
    ("PayStudio - BPAGOS CERT", "bchile_cert_bo"),
    ("Portal de Comercio - BPAGOS CERT", "bchile_cert_pco"),
    ("Autorizador - BPAGOS UAT", "pays_bpagos_uat_aas"),
    ("PayStudio - BPAGOS UAT", "pays_bpagos_uat_bo"),
    ("Portal de Comercio - BPAGOS UAT", "pays_bpagos_uat_pc"),
];

/// Static selection catalogs.
///
/// `environments` is keyed by project name (`GETNET`, `BPAGOS`) and keeps
/// the display order. `databases` maps an environment name to the database
/// identifier that selecting it implies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    #[serde(default = "builtin_browsers")]
    pub browsers: Vec<String>,

    #[serde(default = "builtin_environments")]
    pub environments: BTreeMap<String, Vec<String>>,

    #[serde(default = "builtin_databases")]
    pub databases: BTreeMap<String, String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The catalogs shipped with qadesk.
    pub fn builtin() -> Self {
        Self {
            browsers: builtin_browsers(),
            environments: builtin_environments(),
            databases: builtin_databases(),
        }
    }

    /// Selectable browsers, in display order.
    pub fn browsers(&self) -> &[String] {
        &self.browsers
    }

    /// Environments offered for `project`, in display order.
    pub fn environments(&self, project: Project) -> &[String] {
        self.environments
            .get(&project.to_string())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns true if `browser` is one of the selectable browsers.
    pub fn has_browser(&self, browser: &str) -> bool {
        self.browsers.iter().any(|b| b == browser)
    }

    /// Returns true if `environment` is offered for `project`.
    pub fn has_environment(&self, project: Project, environment: &str) -> bool {
        self.environments(project).iter().any(|e| e == environment)
    }

    /// Database identifier implied by selecting `environment` in `project`.
    ///
    /// Returns `None` when the environment does not belong to the project or
    /// has no mapping.
    pub fn database_for(&self, project: Project, environment: &str) -> Option<&str> {
        if !self.has_environment(project, environment) {
            return None;
        }
        self.databases.get(environment).map(String::as_str)
    }

    /// Environments that have no database mapping, as `(project, environment)`.
    pub fn unmapped_environments(&self) -> Vec<(String, String)> {
        self.environments
            .iter()
            .flat_map(|(project, envs)| {
                envs.iter()
                    .filter(|env| !self.databases.contains_key(*env))
                    .map(move |env| (project.clone(), env.clone()))
            })
            .collect()
    }
}

fn builtin_browsers() -> Vec<String> {
    BROWSERS.iter().map(|b| b.to_string()).collect()
}

fn builtin_environments() -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert(
        Project::Getnet.to_string(),
        GETNET_DATABASES.iter().map(|(env, _)| env.to_string()).collect(),
    );
    map.insert(
        Project::Bpagos.to_string(),
        BPAGOS_DATABASES.iter().map(|(env, _)| env.to_string()).collect(),
    );
    map
}

fn builtin_databases() -> BTreeMap<String, String> {
    GETNET_DATABASES
        .iter()
        .chain(BPAGOS_DATABASES)
        .map(|(env, db)| (env.to_string(), db.to_string()))
        .collect()
}
