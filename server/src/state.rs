use crate::repository::EventTemplateRepository;

#[derive(Clone)]
pub struct AppState<R> {
    pub templates: R,
}

impl<R: EventTemplateRepository> AppState<R> {
    pub fn new(templates: R) -> Self {
        Self { templates }
    }
}
