use std::{collections::HashMap, sync::Arc};

use futures::lock::Mutex;

use crate::{Question, Report};

database_derived!(
    /// Reference implementation
    #[derive(Default)]
    pub struct ReferenceDb {
        pub reports: Arc<Mutex<HashMap<String, Report>>>,
        pub questions: Arc<Mutex<HashMap<String, Question>>>,
    }
);

impl ReferenceDb {
    /// Remove all stored documents
    pub async fn clear(&self) {
        self.reports.lock().await.clear();
        self.questions.lock().await.clear();
    }
}
