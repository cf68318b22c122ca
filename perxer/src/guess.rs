//! Type guessing
//!
//! The engine tries one conversion against an ordered list of candidate
//! types and reports the first candidate that accepts the input. Rejections
//! are collected for diagnostics; guessing itself never fails.
//!
//! When several candidates accept the same input the earliest one in the
//! supplied order wins. This also holds with parallel evaluation: results are
//! resolved by candidate position, not by completion time.

use std::fmt;
use std::sync::Arc;
use std::thread;

use perxer_core::{CodecError, CodecResult, Location, TypeModel};

use crate::format::{PerFormat, XerFormat};
use crate::settings::CodecSettings;
use crate::transcoder::Transcoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    PerToXer,
    XerToPer,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::PerToXer => write!(f, "PER->XER"),
            Direction::XerToPer => write!(f, "XER->PER"),
        }
    }
}

/// Why one candidate rejected the input
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateFailure {
    pub ty: Arc<TypeModel>,
    pub error: CodecError,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.ty.name(), self.error)
    }
}

/// Outcome of a guess
#[derive(Debug, Clone, PartialEq)]
pub enum GuessResult<T> {
    Matched { ty: Arc<TypeModel>, output: T },
    NoMatch { failures: Vec<CandidateFailure> },
}

impl<T> GuessResult<T> {
    pub fn is_successful(&self) -> bool {
        matches!(self, GuessResult::Matched { .. })
    }

    pub fn matched_type(&self) -> Option<&Arc<TypeModel>> {
        match self {
            GuessResult::Matched { ty, .. } => Some(ty),
            GuessResult::NoMatch { .. } => None,
        }
    }

    /// The converted output of the matched type
    pub fn data(&self) -> Option<&T> {
        match self {
            GuessResult::Matched { output, .. } => Some(output),
            GuessResult::NoMatch { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            GuessResult::Matched { output, .. } => Some(output),
            GuessResult::NoMatch { .. } => None,
        }
    }

    /// Every candidate's rejection; empty after a match
    pub fn failures(&self) -> &[CandidateFailure] {
        match self {
            GuessResult::Matched { .. } => &[],
            GuessResult::NoMatch { failures } => failures,
        }
    }

    fn map<U>(self, f: impl FnOnce(T) -> U) -> GuessResult<U> {
        match self {
            GuessResult::Matched { ty, output } => GuessResult::Matched {
                ty,
                output: f(output),
            },
            GuessResult::NoMatch { failures } => GuessResult::NoMatch { failures },
        }
    }

    /// Every candidate rejected with the same error, before any was tried
    fn rejected_by_all(candidates: &[Arc<TypeModel>], error: CodecError) -> Self {
        GuessResult::NoMatch {
            failures: candidates
                .iter()
                .map(|ty| CandidateFailure {
                    ty: ty.clone(),
                    error: error.clone(),
                })
                .collect(),
        }
    }
}

/// Tries candidate types in order until one converts the input
#[derive(Debug, Clone, Default)]
pub struct TypeGuessEngine {
    transcoder: Transcoder,
    parallel: bool,
}

impl TypeGuessEngine {
    pub fn new(settings: CodecSettings) -> Self {
        Self {
            transcoder: Transcoder::new(settings),
            parallel: false,
        }
    }

    /// Evaluate all candidates on scoped threads
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn transcoder(&self) -> &Transcoder {
        &self.transcoder
    }

    pub fn guess_per_to_xer(&self, candidates: &[Arc<TypeModel>], per: &[u8]) -> GuessResult<String> {
        self.guess(candidates, Direction::PerToXer, |ty| {
            self.transcoder.per_to_xer(ty, per)
        })
    }

    pub fn guess_xer_to_per(&self, candidates: &[Arc<TypeModel>], xer: &str) -> GuessResult<Vec<u8>> {
        self.guess(candidates, Direction::XerToPer, |ty| {
            self.transcoder.xer_to_per(ty, xer)
        })
    }

    /// Run `attempt` against each candidate and keep the first success
    pub fn guess<T, F>(
        &self,
        candidates: &[Arc<TypeModel>],
        direction: Direction,
        attempt: F,
    ) -> GuessResult<T>
    where
        T: Send,
        F: Fn(&TypeModel) -> CodecResult<T> + Sync,
    {
        if self.parallel && candidates.len() > 1 {
            self.guess_parallel(candidates, direction, &attempt)
        } else {
            self.guess_sequential(candidates, direction, &attempt)
        }
    }

    fn guess_sequential<T, F>(
        &self,
        candidates: &[Arc<TypeModel>],
        direction: Direction,
        attempt: &F,
    ) -> GuessResult<T>
    where
        F: Fn(&TypeModel) -> CodecResult<T>,
    {
        let mut failures = Vec::new();
        for ty in candidates {
            match attempt(&**ty) {
                Ok(output) => return matched(direction, ty, output),
                Err(error) => failures.push(rejected(direction, ty, error)),
            }
        }
        GuessResult::NoMatch { failures }
    }

    fn guess_parallel<T, F>(
        &self,
        candidates: &[Arc<TypeModel>],
        direction: Direction,
        attempt: &F,
    ) -> GuessResult<T>
    where
        T: Send,
        F: Fn(&TypeModel) -> CodecResult<T> + Sync,
    {
        let results: Vec<CodecResult<T>> = thread::scope(|scope| {
            let handles: Vec<_> = candidates
                .iter()
                .map(|ty| scope.spawn(move || attempt(&**ty)))
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(CodecError::unsupported(
                            "candidate evaluation panicked",
                            Location::Unknown,
                        ))
                    })
                })
                .collect()
        });

        let mut failures = Vec::new();
        for (ty, result) in candidates.iter().zip(results) {
            match result {
                Ok(output) => return matched(direction, ty, output),
                Err(error) => failures.push(rejected(direction, ty, error)),
            }
        }
        GuessResult::NoMatch { failures }
    }
}

fn matched<T>(direction: Direction, ty: &Arc<TypeModel>, output: T) -> GuessResult<T> {
    log::debug!("{} guess matched {}", direction, ty.name());
    GuessResult::Matched {
        ty: ty.clone(),
        output,
    }
}

fn rejected(direction: Direction, ty: &Arc<TypeModel>, error: CodecError) -> CandidateFailure {
    log::debug!("{} candidate {} rejected: {}", direction, ty.name(), error);
    CandidateFailure {
        ty: ty.clone(),
        error,
    }
}

/// Guess the type of PER bytes and convert them to compact XER
pub fn guess_per_to_xer(candidates: &[Arc<TypeModel>], per: &[u8]) -> GuessResult<String> {
    TypeGuessEngine::default().guess_per_to_xer(candidates, per)
}

/// Guess the type of XER text and convert it to PER bytes
pub fn guess_xer_to_per(candidates: &[Arc<TypeModel>], xer: &str) -> GuessResult<Vec<u8>> {
    TypeGuessEngine::default().guess_xer_to_per(candidates, xer)
}

/// [`guess_per_to_xer`] through caller-chosen wire formats
///
/// Input that the PER format cannot read is reported as a rejection by every
/// candidate.
pub fn guess_per_to_xer_with<P, X>(
    candidates: &[Arc<TypeModel>],
    input: &P::Wire,
    per_format: &P,
    xer_format: &X,
    settings: &CodecSettings,
) -> GuessResult<<X::Wire as ToOwned>::Owned>
where
    P: PerFormat,
    X: XerFormat,
{
    let per = match per_format.to_internal(input) {
        Ok(per) => per,
        Err(error) => {
            log::debug!("{} guess input rejected: {}", Direction::PerToXer, error);
            return GuessResult::rejected_by_all(candidates, error);
        }
    };
    TypeGuessEngine::new(settings.clone())
        .guess_per_to_xer(candidates, &per)
        .map(|xml| xer_format.from_internal(xml))
}

/// [`guess_xer_to_per`] through caller-chosen wire formats
pub fn guess_xer_to_per_with<P, X>(
    candidates: &[Arc<TypeModel>],
    input: &X::Wire,
    per_format: &P,
    xer_format: &X,
    settings: &CodecSettings,
) -> GuessResult<<P::Wire as ToOwned>::Owned>
where
    P: PerFormat,
    X: XerFormat,
{
    let xml = match xer_format.to_internal(input) {
        Ok(xml) => xml,
        Err(error) => {
            log::debug!("{} guess input rejected: {}", Direction::XerToPer, error);
            return GuessResult::rejected_by_all(candidates, error);
        }
    };
    TypeGuessEngine::new(settings.clone())
        .guess_xer_to_per(candidates, &xml)
        .map(|per| per_format.from_internal(&per))
}
