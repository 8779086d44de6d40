use crate::storage::FileStorage;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState<S> {
    pub storage: S,
}

impl<S> AppState<S>
where
    S: FileStorage,
{
    pub fn new(storage: S) -> Self {
        Self { storage }
    }
}
