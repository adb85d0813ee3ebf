use std::sync::Arc;

use loadstat_core::ProgressFn;

mod format;
mod summary;

use summary::{render, render_progress};

use super::{OutputFormatter, SummaryView};

pub(crate) struct HumanReadableOutput;

impl OutputFormatter for HumanReadableOutput {
    fn progress(&self) -> Option<ProgressFn> {
        Some(Arc::new(|u| eprintln!("{}", render_progress(&u))))
    }

    fn print_summary(&self, view: &SummaryView<'_>) -> anyhow::Result<()> {
        print!("{}", render(view));

        if !view.violations.is_empty() {
            eprintln!("thresholds failed:");
            for v in view.violations {
                eprintln!("  {v}");
            }
        }

        if view.replay.as_ref().is_some_and(|r| !r.matched) {
            eprintln!("replay: live snapshots differ from the batch report");
        }

        Ok(())
    }
}
