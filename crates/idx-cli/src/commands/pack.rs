//! `pack` command implementation (spec §6): scan a repository into a
//! durable indexing context, then run one publication cycle.

use idx_contrib::default_registry;
use idx_core::IndexingContext;
use idx_pack::{Format, Packer, PackerRequest};
use idx_scan::{DefaultScanningListener, Scanner};
use idx_util::errors::IndexerError;
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

#[allow(clippy::too_many_arguments)]
pub fn exec(
    repository: &Path,
    index: &Path,
    target: &Path,
    format: &str,
    chunks: bool,
    checksums: bool,
    chunk_retention: Option<usize>,
    verbose: bool,
) -> ExitCode {
    let format = match Format::from_str(format) {
        Ok(format) => format,
        Err(message) => {
            eprintln!("invalid --format: {message}");
            return ExitCode::from(1);
        }
    };

    let context_id = index
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "default-index".to_string());

    let registry = default_registry();
    let mut context = match IndexingContext::open_or_create(index, context_id, registry.clone()) {
        Ok(context) => context,
        Err(error) => {
            eprintln!("failed to open indexing context: {error}");
            return exit_code_for(&error);
        }
    };

    let mut listener = DefaultScanningListener::new(&mut context);
    let stats = match Scanner::new(repository.to_path_buf()).scan(&mut listener) {
        Ok(stats) => stats,
        Err(error) => {
            eprintln!("failed to scan repository {}: {error}", repository.display());
            return ExitCode::from(2);
        }
    };
    for (uinfo, error) in listener.errors() {
        tracing::warn!(uinfo, %error, "artifact indexed with errors");
    }
    if verbose {
        println!(
            "scanned {} files, indexed {} artifacts ({} errors)",
            stats.files_visited, stats.artifacts_discovered, stats.artifact_errors
        );
    }

    let now_millis = now_millis();
    if let Err(error) = context.commit(now_millis) {
        eprintln!("failed to commit index: {error}");
        return exit_code_for(&error);
    }

    let mut request = PackerRequest::new(target);
    request.format = format;
    request.chunks = chunks;
    request.checksums = checksums;
    if let Some(retention) = chunk_retention {
        request.chunk_retention = retention;
    }

    match Packer::new(&context, &registry).publish(&request, now_millis) {
        Ok(outcome) => {
            for file in &outcome.files_written {
                println!("wrote {}", file.display());
            }
            if outcome.regenerated {
                eprintln!("descriptor was corrupt and has been regenerated; a full dump was published, no chunk was emitted");
                ExitCode::from(3)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            eprintln!("publication failed: {error}");
            exit_code_for(&error)
        }
    }
}

fn exit_code_for(error: &IndexerError) -> ExitCode {
    let code = match error {
        IndexerError::InvalidArgument { .. } => 1,
        IndexerError::Io(_) | IndexerError::IoFailure { .. } | IndexerError::LockObtainFailed { .. } => 2,
        IndexerError::IndexCorruption { .. } => 2,
        IndexerError::Generic { .. } => 4,
    };
    ExitCode::from(code)
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
