//! Change-to-action mapping.
//!
//! Raw `notify` events are first normalised into [`WatchEvent`]s
//! (`add`, `addDir`, `unlink`, `unlinkDir`, `change`), then [`plan`] turns
//! each one into the minimal [`Action`]s that keep the output tree
//! consistent:
//!
//! | Event          | Script    | Style              | Asset                |
//! |----------------|-----------|--------------------|----------------------|
//! | add / change   | nothing   | rebuild stylesheet | mirror file          |
//! | unlink         | nothing   | rebuild stylesheet | remove mirrored file |
//! | addDir         | n/a       | rebuild stylesheet | create mirrored dir  |
//! | unlinkDir      | n/a       | rebuild stylesheet | remove mirrored dir  |
//!
//! Script changes are left to the compiler's own watch mode. Directory events
//! under the style root also rebuild the stylesheet: a directory renamed in or
//! out moves many sources with a single event.

use std::path::{Path, PathBuf};

use notify::event::{ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};

use appforge_core::{Classifier, Domain};

/// A normalised filesystem change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Add(PathBuf),
    AddDir(PathBuf),
    Unlink(PathBuf),
    UnlinkDir(PathBuf),
    Change(PathBuf),
}

impl WatchEvent {
    pub fn path(&self) -> &Path {
        match self {
            WatchEvent::Add(p)
            | WatchEvent::AddDir(p)
            | WatchEvent::Unlink(p)
            | WatchEvent::UnlinkDir(p)
            | WatchEvent::Change(p) => p,
        }
    }

    /// Console description, one line per event.
    pub fn describe(&self) -> String {
        let path = self.path().display();
        match self {
            WatchEvent::Add(_) => format!("- File '{path}' was added"),
            WatchEvent::AddDir(_) => format!("- Directory '{path}' was added"),
            WatchEvent::Unlink(_) => format!("- File '{path}' was removed"),
            WatchEvent::UnlinkDir(_) => format!("- Directory '{path}' was removed"),
            WatchEvent::Change(_) => format!("- Change detected in '{path}'"),
        }
    }
}

/// The minimal pipeline work for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    RebuildStyles,
    MirrorFile(PathBuf),
    RemoveFile(PathBuf),
    MirrorDir(PathBuf),
    RemoveDir(PathBuf),
}

/// Turn a raw backend event into zero or more normalised events.
///
/// The backend does not always say whether a path was a file or a directory;
/// for creations the path is inspected, for removals the mirrored destination
/// decides.
pub fn normalize(event: &Event, classifier: &Classifier) -> Vec<WatchEvent> {
    let paths = &event.paths;
    match &event.kind {
        EventKind::Create(_) => paths.iter().map(|p| created(p)).collect(),
        EventKind::Remove(kind) => paths.iter().map(|p| removed(p, kind, classifier)).collect(),
        EventKind::Modify(ModifyKind::Name(mode)) => match mode {
            RenameMode::From => paths
                .iter()
                .map(|p| removed(p, &RemoveKind::Any, classifier))
                .collect(),
            RenameMode::To => paths.iter().map(|p| created(p)).collect(),
            RenameMode::Both if paths.len() == 2 => vec![
                removed(&paths[0], &RemoveKind::Any, classifier),
                created(&paths[1]),
            ],
            _ => paths
                .iter()
                .map(|p| {
                    if p.exists() {
                        created(p)
                    } else {
                        removed(p, &RemoveKind::Any, classifier)
                    }
                })
                .collect(),
        },
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => paths
            .iter()
            .filter(|p| p.is_file())
            .map(|p| WatchEvent::Change(p.clone()))
            .collect(),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

fn created(path: &Path) -> WatchEvent {
    if path.is_dir() {
        WatchEvent::AddDir(path.to_path_buf())
    } else {
        WatchEvent::Add(path.to_path_buf())
    }
}

fn removed(path: &Path, kind: &RemoveKind, classifier: &Classifier) -> WatchEvent {
    let is_dir = match kind {
        RemoveKind::Folder => true,
        RemoveKind::File => false,
        _ => classifier
            .asset_dir_destination(path)
            .map(|dest| dest.is_dir())
            .unwrap_or(false),
    };
    if is_dir {
        WatchEvent::UnlinkDir(path.to_path_buf())
    } else {
        WatchEvent::Unlink(path.to_path_buf())
    }
}

/// Decide the actions for one normalised event.
pub fn plan(event: &WatchEvent, classifier: &Classifier) -> Vec<Action> {
    match event {
        WatchEvent::Add(path) | WatchEvent::Change(path) => match domain_of(path, classifier) {
            Some(Domain::Style) => vec![Action::RebuildStyles],
            Some(Domain::Asset) => vec![Action::MirrorFile(path.clone())],
            Some(Domain::Script) | None => Vec::new(),
        },
        WatchEvent::Unlink(path) => {
            let mut actions = match domain_of(path, classifier) {
                Some(Domain::Style) => vec![Action::RebuildStyles],
                Some(Domain::Asset) => vec![Action::RemoveFile(path.clone())],
                Some(Domain::Script) | None => Vec::new(),
            };
            // Possibly a directory renamed away from under the style root.
            if path.extension().is_none()
                && path.starts_with(classifier.style_root())
                && !actions.contains(&Action::RebuildStyles)
            {
                actions.push(Action::RebuildStyles);
            }
            actions
        }
        WatchEvent::AddDir(dir) => dir_actions(dir, classifier, Action::MirrorDir(dir.clone())),
        WatchEvent::UnlinkDir(dir) => dir_actions(dir, classifier, Action::RemoveDir(dir.clone())),
    }
}

fn domain_of(path: &Path, classifier: &Classifier) -> Option<Domain> {
    classifier.classify(path).map(|c| c.domain)
}

fn dir_actions(dir: &Path, classifier: &Classifier, mirror: Action) -> Vec<Action> {
    let mut actions = Vec::new();
    if classifier.asset_dir_destination(dir).is_some() {
        actions.push(mirror);
    }
    if dir.starts_with(classifier.style_root()) {
        actions.push(Action::RebuildStyles);
    }
    actions
}
