use vf_classify::CandidateAnalyzer;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AnalyzeArgs;
use crate::output::output;

/// Handle `vfc analyze`. Pure; never opens the store.
pub fn handle(args: &AnalyzeArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let analyzer = CandidateAnalyzer::default();
    let results: Vec<_> = args.urls.iter().map(|url| analyzer.analyze(url)).collect();
    output(&results, flags.format)
}
