//! Build-output side of staging: what to run and how to start it.

pub mod artifact;
pub mod plan;
pub mod sinks;

pub use artifact::{Artifact, ArtifactInspector, ArtifactKind};
pub use plan::{EnvExport, LaunchPlan, LaunchPlanBuilder, WEB_PROCESS};
pub use sinks::{render_bootstrap, render_manifest, StagedOutput};

use std::borrow::Cow;

/// Single-quote `word` for `sh` unless it is made only of characters that
/// never need quoting.
pub(crate) fn shell_quote(word: &str) -> Cow<'_, str> {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '/' | '-'));
    if plain {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', "'\\''")))
    }
}
