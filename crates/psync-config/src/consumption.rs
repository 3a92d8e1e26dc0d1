//! Which config subtrees each command actually reads.
//!
//! Keep this in step with `settings.rs`: a key listed here but never read
//! hides typos; a key read but not listed gets reported as unused.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Offline reconcile of local files.
    Merge,
    /// Diff against the destination without dispatching.
    Plan,
    /// Full pipeline.
    Run,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Merge => "MERGE",
            RunMode::Plan => "PLAN",
            RunMode::Run => "RUN",
        }
    }
}

pub fn consumed_pointers(mode: RunMode) -> &'static [&'static str] {
    match mode {
        RunMode::Merge => MERGE,
        RunMode::Plan => PLAN,
        RunMode::Run => RUN,
    }
}

static MERGE: &[&str] = &[
    "/sources",
    "/differential_price",
    "/defaults",
    "/tax",
    "/allow_list",
    "/work_dir",
    "/output_path",
];

static PLAN: &[&str] = &[
    "/sources",
    "/differential_price",
    "/defaults",
    "/tax",
    "/allow_list",
    "/work_dir",
    "/use_local",
    "/cleanup",
    "/destination",
];

static RUN: &[&str] = &[
    "/dryrun",
    "/cleanup",
    "/use_local",
    "/last_check",
    "/date_format",
    "/work_dir",
    "/batch_size",
    "/state_path",
    "/output_path",
    "/sources",
    "/differential_price",
    "/defaults",
    "/tax",
    "/allow_list",
    "/destination",
];
