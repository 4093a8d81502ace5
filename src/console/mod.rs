//! Console orchestration for icequery.
//!
//! The console composes the connection manager, the query executor and the
//! result grid, and exposes a renderer-agnostic view of its state.

pub mod editor;

pub use editor::Editor;

use std::sync::Arc;

use tracing::debug;

use crate::connection::{ConnectionManager, ConnectionState};
use crate::error::Result;
use crate::grid::{ResultGrid, SortState};
use crate::query::{QueryExecutor, QueryOutcome};

/// Contents of the results pane.
#[derive(Debug, Clone)]
pub enum ResultPane {
    /// No query has run yet.
    Idle,
    Loading,
    /// The last execution failed; carries the engine message.
    Error(String),
    Success(ResultGrid),
}

impl ResultPane {
    pub fn grid(&self) -> Option<&ResultGrid> {
        match self {
            Self::Success(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn grid_mut(&mut self) -> Option<&mut ResultGrid> {
        match self {
            Self::Success(grid) => Some(grid),
            _ => None,
        }
    }
}

/// What a renderer should show.
#[derive(Debug)]
pub enum ConsoleView<'a> {
    /// The connection is coming online.
    Initializing,
    /// The connection failed to come online; nothing else is usable.
    Error { message: String },
    Ready {
        editor: &'a Editor,
        pane: &'a ResultPane,
    },
}

/// Interactive console state.
pub struct Console {
    manager: Arc<ConnectionManager>,
    executor: Arc<QueryExecutor>,
    editor: Editor,
    pane: ResultPane,
    last_sort: SortState,
}

impl Console {
    /// Creates a console with the editor preloaded with `initial_query`.
    pub fn new(manager: Arc<ConnectionManager>, initial_query: impl Into<String>) -> Self {
        let executor = Arc::new(QueryExecutor::new(Arc::clone(&manager)));
        Self {
            manager,
            executor,
            editor: Editor::new(initial_query),
            pane: ResultPane::Idle,
            last_sort: SortState::default(),
        }
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    pub fn executor(&self) -> &Arc<QueryExecutor> {
        &self.executor
    }

    /// Brings the connection online.
    pub async fn mount(&self) -> ConnectionState {
        self.manager.initialize().await
    }

    pub fn view(&self) -> ConsoleView<'_> {
        match self.manager.state() {
            ConnectionState::Uninitialized | ConnectionState::Initializing => {
                ConsoleView::Initializing
            }
            ConnectionState::Failed(err) => ConsoleView::Error {
                message: err.message,
            },
            ConnectionState::Ready(_) => ConsoleView::Ready {
                editor: &self.editor,
                pane: &self.pane,
            },
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn pane(&self) -> &ResultPane {
        &self.pane
    }

    pub fn grid_mut(&mut self) -> Option<&mut ResultGrid> {
        self.pane.grid_mut()
    }

    pub fn is_executing(&self) -> bool {
        matches!(self.pane, ResultPane::Loading)
    }

    /// Starts an execution of the editor text.
    ///
    /// Returns the SQL to run, or `None` if the connection is not ready or an
    /// execution is already pending.
    pub fn begin_execution(&mut self) -> Option<String> {
        if !self.manager.is_ready() || self.is_executing() || !self.editor.can_run() {
            debug!("Ignoring run request");
            return None;
        }

        if let Some(grid) = self.pane.grid() {
            self.last_sort = grid.sort_state().clone();
        }
        self.pane = ResultPane::Loading;
        self.editor.set_disabled(true);
        Some(self.editor.value().to_string())
    }

    /// Applies the result of an execution started by [`begin_execution`](Self::begin_execution).
    ///
    /// A success replaces any previous grid; a failure clears it.
    pub fn finish_execution(&mut self, result: Result<QueryOutcome>) {
        self.editor.set_disabled(false);
        self.pane = match result {
            Ok(QueryOutcome::Success(normalized)) => {
                ResultPane::Success(ResultGrid::with_sort(normalized, self.last_sort.clone()))
            }
            Ok(QueryOutcome::Failure(message)) => ResultPane::Error(message),
            Err(err) => ResultPane::Error(err.message()),
        };
    }

    /// Runs the editor text to completion. Returns false if nothing ran.
    pub async fn submit(&mut self) -> bool {
        let Some(sql) = self.begin_execution() else {
            return false;
        };
        let result = self.executor.execute(&sql).await;
        self.finish_execution(result);
        true
    }
}
