//! Tree Synchronizer
//!
//! One pass over a managed directory walks fetch, diff, reconcile, persist
//! and then recurses: a root directory synchronizes each sub-group directory
//! under the node gate, an intermediate directory clones or pulls each
//! project under the leaf gate. A node-level error aborts that node's
//! subtree only; siblings and the parent still finish and report.

mod leaf;
mod reconcile;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ash_git::VcsExecutor;
use ash_remote::{LeafResource, NodeIdentity, RemoteTree, SubNode};

use crate::diff::diff;
use crate::executor::{BatchItem, BoundedExecutor};
use crate::metadata::{IntermediateSnapshot, MetadataStore, RootSnapshot, Snapshot, SnapshotKind};
use crate::options::SyncOptions;
use crate::report::{ItemOutcome, NodeReport, SyncReport};
use crate::{Error, Result, orphan};

use leaf::{LeafJob, sync_leaf};
use reconcile::{apply_renames, claim_directories, expected_names, resolve_orphans};

pub(crate) use leaf::blocking;
pub(crate) use reconcile::claim_directories as claim_leaf_directories;

/// A sub-group directory scheduled for synchronization.
struct NodeJob {
    identity: NodeIdentity,
    dir: PathBuf,
}

impl BatchItem for NodeJob {
    fn label(&self) -> String {
        self.identity.name.clone()
    }
}

/// Mirrors the remote tree into managed directories.
#[derive(Clone)]
pub struct Synchronizer {
    remote: Arc<dyn RemoteTree>,
    vcs: Arc<dyn VcsExecutor>,
    metadata: MetadataStore,
    options: SyncOptions,
}

impl Synchronizer {
    /// # Errors
    ///
    /// [`Error::InvalidOptions`] when `options` fail validation.
    pub fn new(
        remote: Arc<dyn RemoteTree>,
        vcs: Arc<dyn VcsExecutor>,
        options: SyncOptions,
    ) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            remote,
            vcs,
            metadata: MetadataStore::new(),
            options,
        })
    }

    pub fn with_metadata(mut self, metadata: MetadataStore) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Synchronize the managed directory `dir`, whichever level it is.
    pub async fn sync(&self, dir: &Path) -> Result<SyncReport> {
        match self.metadata.kind(dir)? {
            Some(SnapshotKind::Root) => self.sync_root(dir).await,
            Some(SnapshotKind::Intermediate) => {
                let report = self.sync_intermediate(dir.to_path_buf(), None).await?;
                Ok(SyncReport::single(report))
            }
            None => Err(Error::NotManaged {
                dir: dir.to_path_buf(),
            }),
        }
    }

    /// Create a root directory for `node_id` and give it an empty snapshot.
    ///
    /// The directory is `target`, or a directory named after the node inside
    /// `parent`. Run [`Synchronizer::sync`] on the returned path to fill it.
    pub async fn bootstrap(
        &self,
        node_id: i64,
        parent: &Path,
        target: Option<PathBuf>,
    ) -> Result<PathBuf> {
        let identity = self.on_remote(move |r| r.describe_node(node_id)).await??;
        let dir = match target {
            Some(dir) => dir,
            None => {
                let name = [&identity.name, &identity.slug]
                    .into_iter()
                    .find(|n| !n.is_empty())
                    .cloned()
                    .unwrap_or_else(|| node_id.to_string());
                parent.join(name)
            }
        };

        if self.metadata.kind(&dir)?.is_some() {
            return Err(Error::AlreadyManaged { dir });
        }
        tracing::info!(node_id, dir = %dir.display(), "bootstrapping root directory");
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        self.metadata.save(&dir, &RootSnapshot::empty(identity))?;
        Ok(dir)
    }

    async fn on_remote<T, F>(&self, f: F) -> Result<ash_remote::Result<T>>
    where
        F: FnOnce(&dyn RemoteTree) -> ash_remote::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let remote = Arc::clone(&self.remote);
        tokio::task::spawn_blocking(move || f(remote.as_ref()))
            .await
            .map_err(|e| Error::ExecutorUnavailable {
                message: format!("remote call did not complete: {e}"),
            })
    }

    async fn fetch_sub_nodes(&self, node_id: i64) -> Result<Vec<SubNode>> {
        self.on_remote(move |r| r.list_child_sub_nodes(node_id))
            .await?
            .map_err(|source| Error::Fetch { node_id, source })
    }

    async fn fetch_leaves(&self, node_id: i64) -> Result<Vec<LeafResource>> {
        self.on_remote(move |r| r.list_child_leaf_resources(node_id))
            .await?
            .map_err(|source| Error::Fetch { node_id, source })
    }

    /// Fill an identity persisted without name or path. Failure is only logged.
    async fn complete_identity(&self, node: &mut NodeIdentity) {
        if !node.is_incomplete() {
            return;
        }
        let node_id = node.id;
        match self.on_remote(move |r| r.describe_node(node_id)).await {
            Ok(Ok(described)) => {
                tracing::debug!(node_id, name = %described.name, "filled node identity");
                node.name = described.name;
                node.slug = described.slug;
            }
            Ok(Err(e)) => tracing::warn!(node_id, error = %e, "could not describe node"),
            Err(e) => tracing::warn!(node_id, error = %e, "could not describe node"),
        }
    }

    fn persist<S: Snapshot>(&self, dir: &Path, snapshot: &S) -> Result<()> {
        if self.options.dry_run {
            tracing::debug!(dir = %dir.display(), "dry run, snapshot not saved");
            return Ok(());
        }
        self.metadata.save(dir, snapshot)
    }

    /// Create a sub-group directory with an empty snapshot unless it already
    /// carries one.
    fn scaffold(&self, dir: &Path, identity: &NodeIdentity) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
        if self.metadata.kind(dir)?.is_none() {
            tracing::info!(dir = %dir.display(), "scaffolding sub-group directory");
            self.metadata
                .save(dir, &IntermediateSnapshot::empty(identity.clone()))?;
        }
        Ok(())
    }

    async fn sync_root(&self, dir: &Path) -> Result<SyncReport> {
        let mut snapshot: RootSnapshot =
            self.metadata.load(dir)?.ok_or_else(|| Error::NotManaged {
                dir: dir.to_path_buf(),
            })?;
        let node_id = snapshot.node.id;
        tracing::info!(node_id, dir = %dir.display(), "syncing group");

        let fetched = self.fetch_sub_nodes(node_id).await?;
        let valid: Vec<NodeIdentity> = fetched
            .into_iter()
            .filter_map(|sub| {
                if sub.is_soft_deleted() {
                    tracing::info!(id = sub.identity.id, name = %sub.identity.name, "skipping sub-group marked for deletion");
                    None
                } else {
                    Some(sub.identity)
                }
            })
            .collect();

        let changes = diff(&snapshot.children, &valid)?;
        let claims = claim_directories(&valid);
        let owned = claims.owned_names();

        let mut report = NodeReport::new(dir.to_path_buf(), snapshot.node.clone());
        report.diff = changes.summary();
        report.extend(claims.rejected.iter().cloned());

        let notes = apply_renames(dir, &changes, &owned, self.options.dry_run);
        for child in &claims.owners {
            if let Some(note) = notes.get(&child.id) {
                report.push(if note.applied {
                    ItemOutcome::ok(&child.name, &note.message)
                } else {
                    ItemOutcome::skipped(&child.name, &note.message)
                });
            }
        }

        let mut jobs = Vec::with_capacity(claims.owners.len());
        for child in claims.owners {
            let child_dir = match notes.get(&child.id).and_then(|n| n.pending_from.clone()) {
                Some(old_dir) => old_dir,
                None => dir.join(&child.name),
            };
            if !self.options.dry_run
                && let Err(e) = self.scaffold(&child_dir, &child)
            {
                tracing::warn!(dir = %child_dir.display(), error = %e, "scaffolding failed");
                report.push(ItemOutcome::error(&child.name, e.to_string()));
                continue;
            }
            jobs.push(NodeJob {
                identity: child,
                dir: child_dir,
            });
        }

        self.complete_identity(&mut snapshot.node).await;
        snapshot.children = valid;
        self.persist(dir, &snapshot)?;
        report.node = snapshot.node.clone();

        let orphans = orphan::scan(dir, &expected_names(&owned, &notes))?;
        report.extend(resolve_orphans(
            dir,
            &orphans,
            self.options.clean,
            self.options.dry_run,
        ));
        report.orphans = orphans;

        let executor = BoundedExecutor::new(self.options.node_concurrency)?;
        let this = self.clone();
        let batch = executor
            .run(jobs, move |job: NodeJob| {
                let this = this.clone();
                async move { Ok(this.sync_intermediate(job.dir, Some(job.identity)).await) }
            })
            .await?;

        let mut children = Vec::new();
        for item in batch.results {
            match item.result {
                Ok(Ok(child)) => children.push(child),
                Ok(Err(e)) => {
                    tracing::warn!(name = %item.label, error = %e, "sub-group sync failed");
                    report.push(ItemOutcome::error(&item.label, e.to_string()));
                }
                Err(e) => report.push(ItemOutcome::error(&item.label, e.to_string())),
            }
        }
        children.sort_by(|a, b| a.dir.cmp(&b.dir));

        let mut nodes = vec![report.finish()];
        nodes.extend(children);
        Ok(SyncReport { nodes })
    }

    async fn sync_intermediate(
        &self,
        dir: PathBuf,
        expected: Option<NodeIdentity>,
    ) -> Result<NodeReport> {
        let stored: Option<IntermediateSnapshot> = match self.metadata.kind(&dir)? {
            Some(SnapshotKind::Root) => return Err(Error::UnexpectedSnapshot { dir }),
            Some(SnapshotKind::Intermediate) => self.metadata.load(&dir)?,
            None => None,
        };
        let describe = expected.is_none();
        let mut snapshot = match (stored, expected) {
            (Some(stored), Some(identity)) if stored.node.id != identity.id => {
                tracing::warn!(
                    dir = %dir.display(),
                    found = stored.node.id,
                    expected = identity.id,
                    "snapshot belongs to another node, starting from an empty one"
                );
                IntermediateSnapshot::empty(identity)
            }
            (Some(mut stored), Some(identity)) => {
                stored.node = identity;
                stored
            }
            (Some(stored), None) => stored,
            (None, Some(identity)) => IntermediateSnapshot::empty(identity),
            (None, None) => return Err(Error::NotManaged { dir }),
        };
        let node_id = snapshot.node.id;
        tracing::info!(node_id, dir = %dir.display(), "syncing sub-group");

        let leaves = self.fetch_leaves(node_id).await?;
        let identities: Vec<NodeIdentity> = leaves.iter().map(|l| l.identity.clone()).collect();
        let changes = diff(&snapshot.children, &identities)?;
        let claims = claim_directories(&leaves);
        let owned = claims.owned_names();

        let mut report = NodeReport::new(dir.clone(), snapshot.node.clone());
        report.diff = changes.summary();
        report.extend(claims.rejected.iter().cloned());

        let mut notes = apply_renames(&dir, &changes, &owned, self.options.dry_run);

        if describe {
            self.complete_identity(&mut snapshot.node).await;
        }
        snapshot.children = identities;
        self.persist(&dir, &snapshot)?;
        report.node = snapshot.node.clone();

        let orphans = orphan::scan(&dir, &expected_names(&owned, &notes))?;
        report.extend(resolve_orphans(
            &dir,
            &orphans,
            self.options.clean,
            self.options.dry_run,
        ));
        report.orphans = orphans;

        let jobs: Vec<LeafJob> = claims
            .owners
            .into_iter()
            .map(|leaf| {
                let note = notes.remove(&leaf.identity.id);
                let dest = match note.as_ref().and_then(|n| n.pending_from.clone()) {
                    Some(old_dir) => old_dir,
                    None => dir.join(&leaf.identity.name),
                };
                LeafJob {
                    dest,
                    url: leaf.clone_url(self.options.protocol).to_string(),
                    note: note.map(|n| n.message),
                    name: leaf.identity.name,
                }
            })
            .collect();

        let executor = BoundedExecutor::new(self.options.concurrency)?;
        let vcs = Arc::clone(&self.vcs);
        let dry_run = self.options.dry_run;
        let batch = executor
            .run(jobs, move |job: LeafJob| sync_leaf(Arc::clone(&vcs), job, dry_run))
            .await?;

        for item in batch.results {
            report.push(match item.result {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(name = %item.label, error = %e, "leaf action failed");
                    ItemOutcome::error(&item.label, e.to_string())
                }
            });
        }

        Ok(report.finish())
    }
}
