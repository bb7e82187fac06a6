pub mod cancel;
pub mod commit_pipeline;
pub mod fetcher;
pub mod filter_store;
pub mod surface;

pub use cancel::{cancel_pair, CancelToken, Canceller};
pub use commit_pipeline::{
    CommitOutcome, CommitPipeline, CommitReport, CommitRequest, CommitState, CommitStatus,
    SubmitPath, SurfaceReport, SurfaceStatus,
};
pub use fetcher::{
    default_strategies, fetch_decoded, BasicHttpStrategy, FetchStrategy, PooledHttpStrategy,
};
pub use filter_store::FilterStore;
pub use surface::{DirectorySurface, WallpaperSurface};
