use std::thread;
use std::time::Instant;

use crate::diagnostics::Diagnostic;
use crate::symbols::{SymbolModel, TypeId};

use super::LintOptions;
use super::walker::check_type;

/// Types handed to each worker at minimum; smaller programs are not worth
/// a thread.
const MIN_TYPES_PER_WORKER: usize = 64;

/// Outcome of checking a whole program.
#[derive(Debug, Default, Clone)]
pub struct LintReport {
    /// Sorted by location (file, start, end), then message.
    pub diagnostics: Vec<Diagnostic>,
    pub types_checked: usize,
}

impl LintReport {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity.is_error())
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Run the type walker over every declared concrete type.
///
/// Types are split into contiguous chunks checked on scoped worker threads.
/// The result does not depend on the number of workers.
pub fn check_program<M: SymbolModel + ?Sized>(model: &M, options: &LintOptions) -> LintReport {
    let started = Instant::now();
    let types = model.declared_types();
    let workers = worker_count(types.len(), options.parallelism);

    let mut diagnostics = if workers <= 1 {
        check_chunk(model, &types, options)
    } else {
        check_parallel(model, &types, options, workers)
    };
    diagnostics.sort_by(Diagnostic::location_order);

    tracing::info!(
        target: "lint",
        stage = "lint.check_program",
        types = types.len(),
        workers,
        diagnostics = diagnostics.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
    );
    LintReport {
        diagnostics,
        types_checked: types.len(),
    }
}

fn check_chunk<M: SymbolModel + ?Sized>(
    model: &M,
    types: &[TypeId],
    options: &LintOptions,
) -> Vec<Diagnostic> {
    types
        .iter()
        .flat_map(|&ty| check_type(model, ty, options))
        .collect()
}

fn check_parallel<M: SymbolModel + ?Sized>(
    model: &M,
    types: &[TypeId],
    options: &LintOptions,
    workers: usize,
) -> Vec<Diagnostic> {
    let per_worker = types.len().div_ceil(workers);
    thread::scope(|scope| {
        let tasks: Vec<_> = types
            .chunks(per_worker)
            .map(|chunk| scope.spawn(move || check_chunk(model, chunk, options)))
            .collect();
        let mut merged = Vec::new();
        for task in tasks {
            match task.join() {
                Ok(diagnostics) => merged.extend(diagnostics),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        merged
    })
}

fn worker_count(types: usize, requested: Option<usize>) -> usize {
    let available = requested
        .or_else(|| thread::available_parallelism().map(|n| n.get()).ok())
        .unwrap_or(1)
        .max(1);
    if requested.is_some() {
        return available.min(types.max(1));
    }
    available.min(types / MIN_TYPES_PER_WORKER).max(1)
}
