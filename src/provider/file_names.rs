//! File-name provider
//!
//! Folders are listed once in `initialize()` (in parallel) and each list is
//! shuffled. With several folders, a 100-slot
//! [`PercentageTable`](crate::distribution::weighted::PercentageTable)
//! decides which folder serves each value; files inside a folder are handed
//! out round-robin.
//!
//! A pattern containing `${name}` placeholders is resolved on every call
//! from the values already generated for the same invocation, and the folder
//! is listed again for the resolved pattern.

use super::ParameterDataProvider;
use crate::data::{ArgumentValue, FileContainer, FileNamesDataConfig, ParameterProviderLevel, ParameterValue};
use crate::distribution::sequential::{wrap_next, WrappingCursor};
use crate::distribution::uniform::UniformSampler;
use crate::distribution::weighted::PercentageTable;
use crate::error::Error;
use crate::Result;
use rayon::prelude::*;
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Files found for one folder at initialisation
struct LoadedContainer {
    container: FileContainer,
    files: Vec<String>,
}

/// Immutable result of `initialize()`
struct Loaded {
    containers: Vec<LoadedContainer>,
    /// Container index per slot; a single entry when there is one folder
    slots: Vec<usize>,
}

#[derive(Default)]
struct ContainerCursors {
    shared: WrappingCursor,
    per_thread: HashMap<u64, WrappingCursor>,
}

#[derive(Default)]
struct Cursors {
    slot: WrappingCursor,
    thread_slots: HashMap<u64, u64>,
    containers: Vec<ContainerCursors>,
}

pub struct FileNamesParameterDataProvider {
    config: FileNamesDataConfig,
    seed: Option<u64>,
    loaded: Mutex<Option<Arc<Loaded>>>,
    cursors: Mutex<Cursors>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Replace `${name}` placeholders with previously generated values
///
/// Placeholders without a matching value are left as they are.
pub fn resolve_pattern(pattern: &str, previous: &[ArgumentValue]) -> String {
    let mut resolved = String::with_capacity(pattern.len());
    let mut rest = pattern;

    while let Some(start) = rest.find("${") {
        resolved.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            resolved.push_str(&rest[start..]);
            return resolved;
        };

        let name = &after[..end];
        match previous.iter().find(|arg| arg.name == name) {
            Some(arg) => resolved.push_str(&arg.value.to_string()),
            None => resolved.push_str(&rest[start..start + end + 3]),
        }
        rest = &after[end + 1..];
    }

    resolved.push_str(rest);
    resolved
}

/// Compile a regex that has to match the whole file name
fn full_match(pattern: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

fn list_files(folder: &Path, matcher: Option<&Regex>, recursive: bool, full_path: bool) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            if recursive {
                names.extend(list_files(&path, matcher, recursive, full_path)?);
            }
            continue;
        }
        if !path.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if matcher.map_or(true, |m| m.is_match(&name)) {
            names.push(if full_path {
                path.to_string_lossy().into_owned()
            } else {
                name
            });
        }
    }
    Ok(names)
}

impl FileNamesParameterDataProvider {
    pub fn new(config: FileNamesDataConfig) -> Self {
        Self {
            config,
            seed: None,
            loaded: Mutex::new(None),
            cursors: Mutex::new(Cursors::default()),
        }
    }

    /// Shuffle file lists reproducibly
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of files found per folder at initialisation
    pub fn file_counts(&self) -> Vec<usize> {
        lock(&self.loaded)
            .as_ref()
            .map(|loaded| loaded.containers.iter().map(|c| c.files.len()).collect())
            .unwrap_or_default()
    }

    fn load_container(&self, index: usize, container: &FileContainer) -> Result<LoadedContainer> {
        if !container.folder.is_dir() {
            return Err(Error::config(format!(
                "{} does not exist or is not a directory",
                container.folder.display()
            )));
        }

        // templated patterns are resolved per call; list everything for now
        let matcher = if container.is_pattern_containing_params() {
            None
        } else {
            Some(full_match(&container.pattern).map_err(|e| {
                Error::config(format!("Invalid file name regex '{}': {}", container.pattern, e))
            })?)
        };

        let mut files = list_files(
            &container.folder,
            matcher.as_ref(),
            self.config.recursive_search,
            self.config.return_full_path,
        )?;
        if files.is_empty() {
            return Err(Error::config(format!(
                "Directory '{}' is empty or doesn't have files matching regex '{}'",
                container.folder.display(),
                container.pattern
            )));
        }

        let mut sampler = match self.seed {
            Some(seed) => UniformSampler::with_seed(seed.wrapping_add(index as u64)),
            None => UniformSampler::new(),
        };
        sampler.shuffle(&mut files);

        Ok(LoadedContainer {
            container: container.clone(),
            files,
        })
    }

    fn loaded(&self) -> Result<Arc<Loaded>> {
        lock(&self.loaded).clone().ok_or_else(|| Error::NotInitialized {
            parameter: self.config.parameter_name.clone(),
        })
    }

    /// Files of a container for this call
    fn candidates<'a>(&self, loaded: &'a LoadedContainer, previous: &[ArgumentValue]) -> Result<Cow<'a, [String]>> {
        if !loaded.container.is_pattern_containing_params() {
            return Ok(Cow::Borrowed(loaded.files.as_slice()));
        }

        let resolved = resolve_pattern(&loaded.container.pattern, previous);
        let no_match = || {
            Error::Generation(format!(
                "No files matching regex pattern '{}' in directory '{}'",
                resolved,
                loaded.container.folder.display()
            ))
        };

        let matcher = full_match(&resolved).map_err(|_| no_match())?;
        let mut files = list_files(
            &loaded.container.folder,
            Some(&matcher),
            self.config.recursive_search,
            self.config.return_full_path,
        )?;
        if files.is_empty() {
            return Err(no_match());
        }
        files.sort();
        Ok(Cow::Owned(files))
    }

    fn argument(&self, file: &str) -> ArgumentValue {
        ArgumentValue {
            name: self.config.parameter_name.clone(),
            value: ParameterValue::Text(file.to_string()),
        }
    }
}

impl ParameterDataProvider for FileNamesParameterDataProvider {
    fn parameter_name(&self) -> &str {
        &self.config.parameter_name
    }

    fn level(&self) -> ParameterProviderLevel {
        self.config.level
    }

    fn initialize(&self) -> Result<()> {
        if self.config.containers.is_empty() {
            return Err(Error::config("No folders are specified"));
        }
        self.config.verify()?;

        let containers = self
            .config
            .containers
            .par_iter()
            .enumerate()
            .map(|(index, container)| self.load_container(index, container))
            .collect::<Result<Vec<_>>>()?;

        let slots = if containers.len() == 1 {
            vec![0]
        } else {
            let percentages: Vec<u32> = containers.iter().map(|c| c.container.percentage).collect();
            PercentageTable::new(&percentages).slots().to_vec()
        };

        for loaded in &containers {
            debug!(
                "Parameter '{}': {} files in '{}' ({}%)",
                self.config.parameter_name,
                loaded.files.len(),
                loaded.container.folder.display(),
                loaded.container.percentage
            );
        }

        // cursors are sized before the new listing becomes visible to getters
        let mut cursors = lock(&self.cursors);
        *cursors = Cursors::default();
        cursors.containers.resize_with(containers.len(), ContainerCursors::default);

        let previous = lock(&self.loaded).replace(Arc::new(Loaded { containers, slots }));
        drop(cursors);
        if previous.is_some() {
            warn!(
                "Data provider for parameter '{}' initialized again, all positions start over",
                self.config.parameter_name
            );
        }
        Ok(())
    }

    fn generate_new_value_per_thread(&self, thread_id: u64, previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        let loaded = self.loaded()?;
        let slot_count = loaded.slots.len() as u64;

        let container_index = {
            let mut cursors = lock(&self.cursors);
            // a new thread starts at the current shared slot
            let slot = match cursors.thread_slots.get(&thread_id) {
                Some(&slot) => wrap_next(slot, slot_count),
                None => cursors.slot.position() % slot_count,
            };
            cursors.thread_slots.insert(thread_id, slot);
            loaded.slots[slot as usize]
        };

        let container = &loaded.containers[container_index];
        let files = self.candidates(container, previous)?;
        let index = {
            let mut cursors = lock(&self.cursors);
            cursors.containers[container_index]
                .per_thread
                .entry(thread_id)
                .or_default()
                .next_index(files.len() as u64)
        };
        Ok(self.argument(&files[index as usize]))
    }

    fn generate_new_value_per_thread_static(&self, thread_id: u64, previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        let loaded = self.loaded()?;
        let slot_count = loaded.slots.len() as u64;

        let container_index = {
            let mut cursors = lock(&self.cursors);
            let slot = match cursors.thread_slots.get(&thread_id) {
                Some(&slot) => slot,
                None => {
                    let slot = cursors.slot.next_index(slot_count);
                    cursors.thread_slots.insert(thread_id, slot);
                    slot
                }
            };
            loaded.slots[slot as usize]
        };

        let files = self.candidates(&loaded.containers[container_index], previous)?;
        let index = thread_id % files.len() as u64;
        Ok(self.argument(&files[index as usize]))
    }

    fn generate_new_value_per_invocation(&self, previous: &[ArgumentValue]) -> Result<ArgumentValue> {
        let loaded = self.loaded()?;

        let container_index = {
            let mut cursors = lock(&self.cursors);
            let slot = cursors.slot.next_index(loaded.slots.len() as u64);
            loaded.slots[slot as usize]
        };

        let files = self.candidates(&loaded.containers[container_index], previous)?;
        let index = lock(&self.cursors).containers[container_index]
            .shared
            .next_index(files.len() as u64);
        Ok(self.argument(&files[index as usize]))
    }
}
