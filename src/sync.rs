use crate::context::RunContext;
use crate::entry::{self, Entry};
use crate::generator::MetadataGenerator;
use crate::metadata::{self, Metadata};
use crate::relocate::{self, Relocation};
use eyre::{Context, Result};
use std::fmt;
use std::fs;
use std::path::Path;

/// Why an entry needs its metadata regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReason {
    Forced,
    Unplaced,
    MissingMetadata,
    MissingHash,
    HashMismatch,
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StaleReason::Forced => "forced",
            StaleReason::Unplaced => "not yet placed in a category",
            StaleReason::MissingMetadata => "no metadata file",
            StaleReason::MissingHash => "no content hash",
            StaleReason::HashMismatch => "content changed",
        };
        write!(f, "{}", text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Staleness {
    Current,
    Stale(StaleReason),
}

impl Staleness {
    pub fn is_stale(&self) -> bool {
        matches!(self, Staleness::Stale(_))
    }
}

/// Result of synchronizing one entry.
#[derive(Debug, Clone)]
pub struct EntryOutcome {
    pub name: String,
    pub staleness: Staleness,
    pub relocation: Option<Relocation>,
}

/// Counts for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub generated: usize,
    pub current: usize,
    pub relocated: usize,
    pub merged: usize,
    /// Entries whose prompt moved away earlier in the same run.
    pub skipped: Vec<String>,
}

impl SyncReport {
    fn record(&mut self, outcome: &EntryOutcome) {
        match outcome.staleness {
            Staleness::Current => self.current += 1,
            Staleness::Stale(_) => self.generated += 1,
        }
        match outcome.relocation {
            Some(Relocation::Renamed { .. }) => self.relocated += 1,
            Some(Relocation::Merged { .. }) => {
                self.relocated += 1;
                self.merged += 1;
            }
            None => {}
        }
    }
}

/// Decide whether metadata must be regenerated. `fingerprint` is the hash of
/// the current prompt bytes.
pub fn classify(force: bool, fingerprint: &str, metadata_path: &Path) -> Result<Staleness> {
    if force {
        return Ok(Staleness::Stale(StaleReason::Forced));
    }
    if !metadata_path.exists() {
        log::info!("Metadata file {} does not exist. Update needed.", metadata_path.display());
        return Ok(Staleness::Stale(StaleReason::MissingMetadata));
    }

    let text = fs::read_to_string(metadata_path).context(format!("Failed to read {}", metadata_path.display()))?;
    match metadata::stored_hash(&text) {
        None => {
            log::info!("No content hash found in {}. Update needed.", metadata_path.display());
            Ok(Staleness::Stale(StaleReason::MissingHash))
        }
        Some(stored) if stored != fingerprint => {
            log::info!("Content hash mismatch for {}. Update needed.", metadata_path.display());
            Ok(Staleness::Stale(StaleReason::HashMismatch))
        }
        Some(_) => {
            log::debug!("Content hash match for {}. No update needed.", metadata_path.display());
            Ok(Staleness::Current)
        }
    }
}

/// Entries with a prompt file under the prompts root, inbox first.
pub fn entries(ctx: &RunContext) -> Vec<Entry> {
    entry::discover_prompts(&ctx.prompts_dir(), &ctx.config.files)
}

/// Classification of one entry without touching anything.
pub fn classify_entry(ctx: &RunContext, entry: &Entry) -> Result<Staleness> {
    if entry.is_inbox() {
        return Ok(Staleness::Stale(StaleReason::Unplaced));
    }
    let prompt_path = entry.prompt_path(&ctx.config.files);
    let content = fs::read(&prompt_path).context(format!("Failed to read {}", prompt_path.display()))?;
    classify(ctx.force, &metadata::fingerprint(&content), &entry.metadata_path(&ctx.config.files))
}

pub struct Synchronizer<'a, G: MetadataGenerator> {
    ctx: &'a RunContext,
    generator: &'a G,
}

impl<'a, G: MetadataGenerator> Synchronizer<'a, G> {
    pub fn new(ctx: &'a RunContext, generator: &'a G) -> Self {
        Self { ctx, generator }
    }

    /// Entries to process, in processing order.
    pub fn entries(&self) -> Vec<Entry> {
        entries(self.ctx)
    }

    /// Synchronize every entry in order. The first error aborts the run;
    /// entries already processed keep their updates.
    pub fn run(&self, mut on_entry: impl FnMut(&EntryOutcome)) -> Result<SyncReport> {
        log::info!("Starting metadata sync in {}", self.ctx.prompts_dir().display());
        let mut report = SyncReport::default();

        for entry in self.entries() {
            // A relocated parent entry carries nested entries along with it
            if !entry.prompt_path(&self.ctx.config.files).is_file() {
                log::warn!("{} moved earlier in this run, skipping it", entry.name());
                report.skipped.push(entry.name());
                continue;
            }
            let outcome = self.sync_entry(&entry)?;
            report.record(&outcome);
            on_entry(&outcome);
        }

        log::info!(
            "Metadata sync completed: {} generated, {} up to date, {} relocated",
            report.generated,
            report.current,
            report.relocated
        );
        Ok(report)
    }

    /// Bring one entry's metadata up to date.
    pub fn sync_entry(&self, entry: &Entry) -> Result<EntryOutcome> {
        let files = &self.ctx.config.files;
        let name = entry.name();
        log::info!("Processing entry: {}", name);

        let prompt_path = entry.prompt_path(files);
        let content = fs::read(&prompt_path).context(format!("Failed to read {}", prompt_path.display()))?;
        let hash = metadata::fingerprint(&content);

        let staleness = if entry.is_inbox() {
            Staleness::Stale(StaleReason::Unplaced)
        } else {
            classify(self.ctx.force, &hash, &entry.metadata_path(files))?
        };

        if !staleness.is_stale() {
            log::info!("Metadata for {} is up to date", name);
            return Ok(EntryOutcome {
                name,
                staleness,
                relocation: None,
            });
        }

        log::info!("Updating metadata for {}", name);
        let text = String::from_utf8_lossy(&content);
        let generated = self
            .generator
            .generate(&text)
            .context(format!("Failed to generate metadata for {}", name))?;

        let relocation = self.reconcile(entry, &generated)?;
        let dir = relocation.as_ref().map(|r| r.target()).unwrap_or(entry.dir.as_path());

        let metadata_path = dir.join(&files.metadata);
        log::info!("Saving metadata to {}", metadata_path.display());
        generated.save_with_hash(&metadata_path, &hash)?;

        Ok(EntryOutcome {
            name,
            staleness,
            relocation,
        })
    }

    /// Move the entry to `<primary_category>/<directory>` if it lives elsewhere.
    fn reconcile(&self, entry: &Entry, generated: &Metadata) -> Result<Option<Relocation>> {
        let root = self.ctx.prompts_dir();
        let target_rel = Entry::canonical_rel(&generated.primary_category, &generated.directory);
        if entry.rel == target_rel {
            return Ok(None);
        }
        let target = root.join(&target_rel);

        if entry.is_inbox() {
            let prompt_path = entry.prompt_path(&self.ctx.config.files);
            return relocate::relocate_file(&prompt_path, &target).map(Some);
        }

        let relocation = relocate::relocate_or_merge(&entry.dir, &target)?;
        if let Some(parent) = entry.dir.parent() {
            relocate::prune_empty_dir(parent, &root)?;
        }
        Ok(Some(relocation))
    }
}
