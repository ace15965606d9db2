//! Root crate facade for the AikiNote backend and client core.

pub use aikinote_core::{
    debounce, filter, modal, pagination, sync, view, SyncError, DEFAULT_MAX_BODY_SIZE,
    DEFAULT_PORT,
};
pub use aikinote_server::{
    config, create_app, db, error, handlers, models, resolve_bind_address, serve_router,
    AppError, AppState, Config, Database, HttpError,
};
