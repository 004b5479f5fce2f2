//! Async client for the Black Duck REST API.
//!
//! Everything the exporter needs from the service goes through
//! [`BlackDuckClient`]: authentication, project/version lookup and BOM
//! retrieval. Requests are issued one at a time.

pub mod records;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use futures::future::{BoxFuture, FutureExt};
use indicatif::ProgressBar;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::models::{Bom, Component};
use records::{ComponentRecord, Page, ProjectRecord, VersionRecord};

const PAGE_SIZE: usize = 100;

/// Connection parameters for the service.
#[derive(Debug, Clone)]
pub struct Connection {
    pub url: String,
    pub api_token: String,
    pub trust_certs: bool,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    bearer_token: String,
}

pub struct BlackDuckClient {
    http: Client,
    base_url: String,
    bearer_token: String,
    progress: ProgressBar,
}

impl BlackDuckClient {
    /// Exchange the API token for a bearer token.
    pub async fn connect(conn: &Connection, progress: ProgressBar) -> Result<Self> {
        let http = Client::builder()
            .timeout(conn.timeout)
            .danger_accept_invalid_certs(conn.trust_certs)
            .user_agent(concat!("bd-spdx-export/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = conn.url.trim_end_matches('/').to_string();
        let url = format!("{}/api/tokens/authenticate", base_url);
        progress.set_message("authenticating");

        let response = http
            .post(&url)
            .header("Authorization", format!("token {}", conn.api_token))
            .header("Accept", "application/vnd.blackducksoftware.user-4+json")
            .send()
            .await
            .with_context(|| format!("failed to reach {}", base_url))?;

        if !response.status().is_success() {
            bail!("authentication against {} failed: HTTP {}", base_url, response.status());
        }

        let auth: AuthResponse = response.json().await?;
        info!(url = %base_url, "authenticated");

        Ok(Self {
            http,
            base_url,
            bearer_token: auth.bearer_token,
            progress,
        })
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        offset: usize,
    ) -> Result<Page<T>> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.bearer_token)
            .header("Accept", "application/json")
            .query(query)
            .query(&[("limit", PAGE_SIZE), ("offset", offset)])
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        if !response.status().is_success() {
            bail!("GET {} returned HTTP {}", url, response.status());
        }

        Ok(response.json().await?)
    }

    /// Read every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut items = Vec::new();
        loop {
            let page: Page<T> = self.get_page(url, query, items.len()).await?;
            let received = page.items.len();
            items.extend(page.items);
            self.progress.tick();
            debug!(url, received, total = page.total_count, "fetched page");
            if !has_more(items.len(), page.total_count, received) {
                break;
            }
        }
        Ok(items)
    }

    /// Look up a project and one of its versions by exact name.
    pub async fn find_project_version(
        &self,
        project: &str,
        version: &str,
    ) -> Result<(ProjectRecord, VersionRecord)> {
        self.progress.set_message(format!("looking up {}/{}", project, version));
        let url = format!("{}/api/projects", self.base_url);
        let projects: Vec<ProjectRecord> = self
            .get_all(&url, &[("q", format!("name:{}", project))])
            .await?;
        let project = projects
            .into_iter()
            .find(|p| p.name == project)
            .ok_or_else(|| anyhow!("project '{}' not found", project))?;

        let version = self
            .find_version(&project, version)
            .await?
            .ok_or_else(|| anyhow!("version '{}' of project '{}' not found", version, project.name))?;

        Ok((project, version))
    }

    async fn find_version(
        &self,
        project: &ProjectRecord,
        version: &str,
    ) -> Result<Option<VersionRecord>> {
        let url = project
            .meta
            .link("versions")
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}/versions", project.meta.href));
        let versions: Vec<VersionRecord> = self
            .get_all(&url, &[("q", format!("versionName:{}", version))])
            .await?;
        Ok(versions.into_iter().find(|v| v.version_name == version))
    }

    /// Every project visible to the token.
    pub async fn list_projects(&self) -> Result<Vec<ProjectRecord>> {
        self.progress.set_message("listing projects");
        let url = format!("{}/api/projects", self.base_url);
        self.get_all(&url, &[]).await
    }

    /// Fetch the version's BOM, hierarchical when the service offers it.
    pub async fn fetch_bom(&self, version: &VersionRecord, force_flat: bool) -> Result<Bom> {
        self.progress
            .set_message(format!("fetching BOM of {}", version.version_name));

        match version.meta.link("hierarchical-components") {
            Some(href) if !force_flat => {
                let mut fetched = HashSet::new();
                let components = fetch_tree(self, href.to_string(), &mut fetched).await?;
                Ok(Bom::hierarchical(components))
            }
            _ => {
                let href = version
                    .meta
                    .link("components")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}/components", version.meta.href));
                let records: Vec<ComponentRecord> = self.get_all(&href, &[]).await?;
                Ok(Bom::flat(
                    records.into_iter().map(|r| r.into_component(None)).collect(),
                ))
            }
        }
    }

    /// Replace components that are themselves projects on the service with
    /// that project version's BOM, stored in [`Component::contains`].
    pub async fn expand_subprojects(&self, bom: &mut Bom, force_flat: bool) -> Result<()> {
        let projects: HashMap<String, ProjectRecord> = self
            .list_projects()
            .await?
            .into_iter()
            .map(|p| (p.name.clone(), p))
            .collect();
        let mut seen = HashSet::new();
        self.expand(&mut bom.components, &projects, &mut seen, force_flat)
            .await
    }

    fn expand<'a>(
        &'a self,
        components: &'a mut [Component],
        projects: &'a HashMap<String, ProjectRecord>,
        seen: &'a mut HashSet<String>,
        force_flat: bool,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            for component in components.iter_mut() {
                if let Some(children) = component.children.as_mut() {
                    self.expand(children, projects, seen, force_flat).await?;
                }

                let (Some(name), Some(version)) = (&component.name, &component.version) else {
                    continue;
                };
                let Some(project) = projects.get(name) else {
                    continue;
                };
                let Some(sub_version) = self.find_version(project, version).await? else {
                    continue;
                };
                if !seen.insert(sub_version.meta.href.clone()) {
                    continue;
                }

                info!(project = %name, version = %version, "expanding sub-project");
                let mut sub = self.fetch_bom(&sub_version, force_flat).await?;
                self.expand(&mut sub.components, projects, seen, force_flat)
                    .await?;
                component.contains = sub.components;
            }
            Ok(())
        }
        .boxed()
    }
}

/// Lists the component records behind a BOM href.
trait ComponentSource: Sync {
    fn components<'a>(&'a self, href: &'a str) -> BoxFuture<'a, Result<Vec<ComponentRecord>>>;
}

impl ComponentSource for BlackDuckClient {
    fn components<'a>(&'a self, href: &'a str) -> BoxFuture<'a, Result<Vec<ComponentRecord>>> {
        self.get_all(href, &[]).boxed()
    }
}

/// Fetch one level of the hierarchy and recurse into each node's children.
///
/// Every `children` href is fetched once per BOM. A node whose children were
/// already fetched (a shared subtree, or a cycle in the reported hierarchy)
/// gets an empty child list; the walker expands the first occurrence.
fn fetch_tree<'a, S: ComponentSource>(
    source: &'a S,
    href: String,
    fetched: &'a mut HashSet<String>,
) -> BoxFuture<'a, Result<Vec<Component>>> {
    async move {
        fetched.insert(href.clone());
        let records = source.components(&href).await?;
        let mut components = Vec::with_capacity(records.len());
        for record in records {
            let children = match record.children_href().map(str::to_string) {
                Some(child_href) if fetched.contains(&child_href) => {
                    debug!(href = %child_href, "children already fetched");
                    Some(Vec::new())
                }
                Some(child_href) => Some(fetch_tree(source, child_href, fetched).await?),
                None => None,
            };
            components.push(record.into_component(children));
        }
        Ok(components)
    }
    .boxed()
}

/// Whether another page needs to be requested.
fn has_more(collected: usize, total: usize, last_page_len: usize) -> bool {
    last_page_len > 0 && collected < total
}
