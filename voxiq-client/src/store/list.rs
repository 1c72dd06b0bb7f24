//! List fetch state with stale-response rejection

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::api::ApiClient;
use crate::session::Session;
use voxiq_common::api::{
    InterviewResponse, InterviewSort, ThemeResponse, ThemeSort, ThemeStatus,
};
use voxiq_common::Result;

/// The (data, loading, error) triple a view renders from
#[derive(Debug, Clone)]
pub struct ListState<T> {
    pub data: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Fetch-state cell enforcing the concurrency rule: only the most
/// recently initiated fetch's result may update state. `begin` hands out
/// a ticket; `resolve` rejects any ticket that is no longer current, so
/// a stale response that lands after a newer request was issued can
/// never clobber the newer result.
pub struct ListCore<T> {
    state: Mutex<ListState<T>>,
    generation: AtomicU64,
}

impl<T: Clone> ListCore<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ListState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// Begin a fetch: marks loading, clears the error, and returns the
    /// ticket the result must present to be applied
    pub fn begin(&self) -> u64 {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut state = self.state.lock().expect("list state poisoned");
        state.loading = true;
        state.error = None;
        ticket
    }

    /// Apply a fetch result. Returns false (and changes nothing) when a
    /// newer fetch owns the state.
    pub fn resolve(&self, ticket: u64, result: Result<Vec<T>>) -> bool {
        if ticket != self.generation.load(Ordering::SeqCst) {
            return false;
        }
        let mut state = self.state.lock().expect("list state poisoned");
        state.loading = false;
        match result {
            Ok(data) => state.data = data,
            Err(e) => state.error = Some(e.to_string()),
        }
        true
    }

    pub fn state(&self) -> ListState<T> {
        self.state.lock().expect("list state poisoned").clone()
    }
}

impl<T: Clone> Default for ListCore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Interviews list with sort/refetch support
pub struct InterviewsStore {
    api: Arc<ApiClient>,
    token: String,
    core: ListCore<InterviewResponse>,
    sort: Mutex<InterviewSort>,
}

impl InterviewsStore {
    pub fn new(api: Arc<ApiClient>, session: &Session) -> Self {
        Self {
            api,
            token: session.token().to_string(),
            core: ListCore::new(),
            sort: Mutex::new(InterviewSort::default()),
        }
    }

    pub fn sort(&self) -> InterviewSort {
        *self.sort.lock().expect("sort poisoned")
    }

    /// Change the sort key; triggers a refetch
    pub async fn set_sort(&self, sort: InterviewSort) {
        *self.sort.lock().expect("sort poisoned") = sort;
        self.refetch().await;
    }

    /// (Re-)issue the query for the current sort key
    pub async fn refetch(&self) {
        let sort = self.sort();
        let ticket = self.core.begin();
        let result = self.api.list_interviews(&self.token, sort).await;
        self.core.resolve(ticket, result);
    }

    pub fn state(&self) -> ListState<InterviewResponse> {
        self.core.state()
    }
}

/// Themes list with sort support and the active/previous partition
pub struct ThemesStore {
    api: Arc<ApiClient>,
    token: String,
    core: ListCore<ThemeResponse>,
    sort: Mutex<ThemeSort>,
}

impl ThemesStore {
    pub fn new(api: Arc<ApiClient>, session: &Session) -> Self {
        Self {
            api,
            token: session.token().to_string(),
            core: ListCore::new(),
            sort: Mutex::new(ThemeSort::default()),
        }
    }

    pub fn sort(&self) -> ThemeSort {
        *self.sort.lock().expect("sort poisoned")
    }

    /// Change the sort key; triggers a refetch
    pub async fn set_sort(&self, sort: ThemeSort) {
        *self.sort.lock().expect("sort poisoned") = sort;
        self.refetch().await;
    }

    /// (Re-)issue the query for the current sort key
    pub async fn refetch(&self) {
        let sort = self.sort();
        let ticket = self.core.begin();
        let result = self.api.list_themes(&self.token, sort).await;
        self.core.resolve(ticket, result);
    }

    pub fn state(&self) -> ListState<ThemeResponse> {
        self.core.state()
    }

    /// Themes in the current synthesis
    pub fn active(&self) -> Vec<ThemeResponse> {
        self.core
            .state()
            .data
            .into_iter()
            .filter(|t| t.status == ThemeStatus::Active)
            .collect()
    }

    /// Themes from previous syntheses
    pub fn previous(&self) -> Vec<ThemeResponse> {
        self.core
            .state()
            .data
            .into_iter()
            .filter(|t| t.status == ThemeStatus::Previous)
            .collect()
    }
}
