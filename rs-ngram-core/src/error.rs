//! Error type shared by every stage of the pipeline.

use std::io;
use std::path::PathBuf;

/// Errors raised while building, persisting or sampling a language model.
#[derive(Debug, thiserror::Error)]
pub enum LmError {
	/// The model order must be at least 1.
	#[error("invalid order {0}: must be >= 1")]
	InvalidOrder(usize),

	/// A generation run needs a positive target size.
	#[error("target size must be >= 1")]
	InvalidTargetSize,

	/// Paragraph sentence range must be non-empty and start at 1 or more.
	#[error("invalid paragraph range {min}..={max}")]
	InvalidParagraphRange {
		/// Lower bound (inclusive).
		min: usize,
		/// Upper bound (inclusive).
		max: usize,
	},

	/// A context with no observations was sampled.
	#[error("cannot sample from a distribution with no observations")]
	DegenerateDistribution,

	/// The model has no sentence-initial words.
	#[error("model has no sentence starts")]
	EmptyModel,

	/// No sentence terminator can be reached from any sentence start.
	#[error("no sentence terminator is reachable from any sentence start")]
	NoReachableTerminator,

	/// The corpus could not be read.
	#[error("failed to read corpus {}: {source}", .path.display())]
	CorpusRead {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// The model file could not be read.
	#[error("failed to read model {}: {source}", .path.display())]
	ModelRead {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// The model file could not be written.
	#[error("failed to write model {}: {source}", .path.display())]
	ModelWrite {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// Encoding or decoding of the binary model failed.
	#[error("model codec error: {0}")]
	ModelCodec(#[from] postcard::Error),

	/// The byte stream does not start with the model magic tag.
	#[error("not a language model file")]
	UnknownFormat,

	/// The byte stream was written by an unknown format version.
	#[error("unsupported model format version {0}")]
	UnsupportedVersion(u16),

	/// Decoded data violates a model invariant.
	#[error("corrupt model: {0}")]
	CorruptModel(&'static str),

	/// Bytes remain after the last model field.
	#[error("{0} trailing bytes after model data")]
	TrailingBytes(usize),

	/// A parallel build worker panicked.
	#[error("build worker panicked")]
	BuildWorker,
}

/// Result alias for language model operations.
pub type LmResult<T> = Result<T, LmError>;
