use crate::catalog::Catalog;
use crate::filter::{filter_labels, QueryMode};
use crate::launch::{LaunchController, LaunchError, LaunchSurface, Severity, SystemLaunchSurface};
use crate::model::LaunchAttempt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub severity: Severity,
    pub title: &'static str,
    pub text: String,
}

impl From<&LaunchError> for StatusMessage {
    fn from(err: &LaunchError) -> Self {
        Self {
            severity: err.severity(),
            title: err.title(),
            text: err.to_string(),
        }
    }
}

pub struct AppState<S = SystemLaunchSurface> {

    pub catalog: Catalog,

    pub filtered: Vec<String>,

    pub selected_index: usize,

    pub query: String,

    pub query_mode: QueryMode,

    pub status: Option<StatusMessage>,

    controller: LaunchController<S>,

}



impl<S: LaunchSurface> AppState<S> {

    pub fn new(catalog: Catalog, query_mode: QueryMode, surface: S) -> Self {

        let mut state = Self {

            catalog,

            filtered: Vec::new(),

            selected_index: 0,

            query: String::new(),

            query_mode,

            status: None,

            controller: LaunchController::new(surface),

        };

        state.update_filter();

        state

    }



    pub fn update_query(&mut self, query: &str) {

        self.query = query.to_string();

        self.update_filter();

    }



    pub fn push_str(&mut self, text: &str) {

        self.query.push_str(text);

        self.update_filter();

    }



    pub fn pop_char(&mut self) {

        if self.query.pop().is_some() {

            self.update_filter();

        }

    }



    pub fn update_filter(&mut self) {

        // Always recomputed from the full label list.

        self.filtered = filter_labels(&self.query, self.catalog.all_labels(), self.query_mode)

            .into_iter()

            .map(str::to_string)

            .collect();

        log::info!("AppState: query='{}', filtered_count={}", self.query, self.filtered.len());

        self.selected_index = 0;

        self.status = None;

    }



    pub fn move_selection(&mut self, delta: i32) {

        if self.filtered.is_empty() {

            self.selected_index = 0;

            return;

        }



        let len = self.filtered.len() as i32;

        let new_index = (self.selected_index as i32 + delta).rem_euclid(len);

        self.selected_index = new_index as usize;

    }



    pub fn select(&mut self, index: usize) -> bool {

        if index < self.filtered.len() {

            self.selected_index = index;

            true

        } else {

            false

        }

    }



    pub fn selected(&self) -> Option<&str> {

        self.filtered.get(self.selected_index).map(String::as_str)

    }



    /// Launches the current selection. A failure is kept as the status message.
    pub fn launch_selected(&mut self) -> Result<LaunchAttempt, LaunchError> {

        let selection = self.filtered.get(self.selected_index).cloned();

        let result = self.controller.launch(&self.catalog, selection.as_deref());

        self.status = result.as_ref().err().map(StatusMessage::from);

        result

    }



    #[cfg(test)]

    pub fn surface(&self) -> &S {

        self.controller.surface()

    }

}
