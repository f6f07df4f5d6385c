pub mod catalog;
pub mod config;
pub mod dates;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod numbers;
pub mod render;
pub mod session;

pub use catalog::{Catalog, CatalogError, CatalogSources, ClientRecord, MatchCandidate};
pub use dates::{Clock, FixedClock, SystemClock};
pub use domain::{Agreement, DeliveryType, FieldSet, PaymentType};
pub use errors::{ApplicationError, DomainError, StepError};
pub use flows::{DialogueEngine, DialogueStep, Reply, TurnOutcome, UserAction};
pub use render::{
    DocumentFields, DocumentRenderer, RenderError, RenderedContent, RenderedDocument, TemplateId,
};
pub use session::{ChatId, InMemorySessionStore, Session, SessionStore, SessionStoreError};
